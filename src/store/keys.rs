//! Series-Key Lifecycle
//!
//! Series keys are created lazily on the first write and never deleted by
//! the gateway. Both request flows go through here: ingest ensures the key
//! exists before writing, queries check existence and 404 when it does not.

use super::{StoreResult, TimeSeriesStore};

/// Existence checks and lazy creation for series keys.
pub struct KeyLifecycle<'s> {
    store: &'s dyn TimeSeriesStore,
}

impl<'s> KeyLifecycle<'s> {
    pub fn new(store: &'s dyn TimeSeriesStore) -> Self {
        Self { store }
    }

    /// Whether `key` already names a series.
    ///
    /// The lookup primitive matches substrings, so the reply is filtered
    /// down to an exact-equality hit before answering.
    pub async fn exists(&self, key: &str) -> StoreResult<bool> {
        let matches = self.store.keys_matching(key).await?;
        Ok(matches.iter().any(|k| k == key))
    }

    /// Create `key` if it does not exist yet.
    ///
    /// The create acknowledgment is not inspected; an unreachable store is
    /// still propagated to the caller.
    pub async fn ensure(&self, key: &str) -> StoreResult<()> {
        if !self.exists(key).await? {
            self.store.create_key(key).await?;
            tracing::info!(key = %key, "series key created");
        }
        Ok(())
    }
}
