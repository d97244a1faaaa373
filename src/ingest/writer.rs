//! Batch Point Writer
//!
//! Applies a normalized batch to a series key one point at a time. Every
//! point is attempted; a failed write is tallied, never propagated, so one
//! bad point cannot abort the rest of the batch.

use serde::Serialize;

use super::PointBatch;
use crate::store::TimeSeriesStore;

/// Per-batch write accounting.
///
/// `success_count + failure_count` always equals the batch length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    pub success_count: usize,
    pub failure_count: usize,
}

impl WriteOutcome {
    /// Whether at least one point was written.
    pub fn any_written(&self) -> bool {
        self.success_count > 0
    }
}

/// Write every point of `batch` to `key`.
///
/// Each point's outcome is a value folded into the tally; store errors are
/// contained here and never raised to the caller.
pub async fn write_batch(
    store: &dyn TimeSeriesStore,
    key: &str,
    batch: &PointBatch,
) -> WriteOutcome {
    let mut outcome = WriteOutcome::default();

    for (&timestamp, &value) in batch.timestamps.iter().zip(&batch.values) {
        match store.add_point(key, timestamp, value).await {
            Ok(()) => outcome.success_count += 1,
            Err(e) => {
                tracing::debug!(key = %key, timestamp, error = %e, "point write failed");
                outcome.failure_count += 1;
            }
        }
    }

    outcome
}
