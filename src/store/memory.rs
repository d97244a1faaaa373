//! In-Process Store Implementation
//!
//! Backs development setups and the test suite. Series live in a
//! `tokio::sync::RwLock`-guarded map; range reads reduce points into
//! fixed-width buckets aligned to multiples of the bucket size.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{Aggregation, RawPoint, StoreError, StoreResult, TimeSeriesStore};

/// In-memory time-series store.
///
/// One ordered map of `timestamp -> value` per series key. Writing the
/// same timestamp twice keeps the latest value.
#[derive(Default)]
pub struct MemoryStore {
    series: RwLock<HashMap<String, BTreeMap<i64, f64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Render an aggregate the way a store wire protocol would: whole numbers
/// without a decimal point, everything else in `f64` display form.
fn format_literal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn reduce(points: &[f64], aggr: Aggregation) -> f64 {
    match aggr {
        Aggregation::Avg => points.iter().sum::<f64>() / points.len() as f64,
        Aggregation::Sum => points.iter().sum(),
        Aggregation::Min => points.iter().copied().fold(f64::INFINITY, f64::min),
        Aggregation::Max => points.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Aggregation::Count => points.len() as f64,
        Aggregation::First => points[0],
        Aggregation::Last => points[points.len() - 1],
    }
}

#[async_trait]
impl TimeSeriesStore for MemoryStore {
    async fn create_key(&self, key: &str) -> StoreResult<()> {
        let mut series = self.series.write().await;
        series.entry(key.to_string()).or_default();
        Ok(())
    }

    async fn add_point(&self, key: &str, timestamp: i64, value: f64) -> StoreResult<()> {
        let mut series = self.series.write().await;
        let points = series
            .get_mut(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;
        points.insert(timestamp, value);
        Ok(())
    }

    async fn range_query(
        &self,
        key: &str,
        start: i64,
        end: i64,
        aggr: Aggregation,
        bucket_seconds: i64,
    ) -> StoreResult<Vec<RawPoint>> {
        let series = self.series.read().await;
        let points = series
            .get(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;

        // inverted bounds are an empty range
        if start > end {
            return Ok(Vec::new());
        }

        let width = bucket_seconds.max(1);
        let mut buckets: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
        for (&ts, &value) in points.range(start..=end) {
            let bucket = ts - ts.rem_euclid(width);
            buckets.entry(bucket).or_default().push(value);
        }

        Ok(buckets
            .into_iter()
            .map(|(bucket, values)| RawPoint::new(bucket, format_literal(reduce(&values, aggr))))
            .collect())
    }

    async fn keys_matching(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let series = self.series.read().await;
        let mut keys: Vec<String> = series
            .keys()
            .filter(|k| k.contains(pattern))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.create_key("k1").await.unwrap();
        store.add_point("k1", 100, 1.0).await.unwrap();
        store.add_point("k1", 110, 2.0).await.unwrap();
        store.add_point("k1", 160, 9.0).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_add_point_requires_key() {
        let store = MemoryStore::new();
        let err = store.add_point("ghost", 1, 1.0).await.unwrap_err();
        assert!(matches!(err, StoreError::KeyNotFound(_)));
    }

    #[tokio::test]
    async fn test_range_is_inclusive() {
        let store = seeded().await;
        let points = store
            .range_query("k1", 100, 160, Aggregation::Last, 1)
            .await
            .unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].timestamp, 100);
        assert_eq!(points[2].timestamp, 160);
    }

    #[tokio::test]
    async fn test_bucket_alignment_and_average() {
        let store = seeded().await;
        // 60s buckets: [60..120) holds 1.0 and 2.0, [120..180) holds 9.0
        let points = store
            .range_query("k1", 0, 200, Aggregation::Avg, 60)
            .await
            .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], RawPoint::new(60, "1.5"));
        assert_eq!(points[1], RawPoint::new(120, "9"));
    }

    #[tokio::test]
    async fn test_whole_aggregates_have_integer_literals() {
        let store = MemoryStore::new();
        store.create_key("k1").await.unwrap();
        store.add_point("k1", 10, 40.0).await.unwrap();
        store.add_point("k1", 20, 44.0).await.unwrap();

        let points = store
            .range_query("k1", 0, 100, Aggregation::Avg, 100)
            .await
            .unwrap();
        // avg is 42, a whole number, so no decimal point in the literal
        assert_eq!(points[0].value, "42");

        let points = store
            .range_query("k1", 0, 100, Aggregation::Count, 100)
            .await
            .unwrap();
        assert_eq!(points[0].value, "2");
    }

    #[tokio::test]
    async fn test_min_max_sum() {
        let store = seeded().await;
        let min = store
            .range_query("k1", 0, 200, Aggregation::Min, 1000)
            .await
            .unwrap();
        assert_eq!(min[0].value, "1");

        let max = store
            .range_query("k1", 0, 200, Aggregation::Max, 1000)
            .await
            .unwrap();
        assert_eq!(max[0].value, "9");

        let sum = store
            .range_query("k1", 0, 200, Aggregation::Sum, 1000)
            .await
            .unwrap();
        assert_eq!(sum[0].value, "12");
    }

    #[tokio::test]
    async fn test_inverted_bounds_are_empty() {
        let store = seeded().await;
        let points = store
            .range_query("k1", 200, 100, Aggregation::Avg, 1)
            .await
            .unwrap();
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_timestamp_keeps_latest() {
        let store = MemoryStore::new();
        store.create_key("k1").await.unwrap();
        store.add_point("k1", 100, 1.0).await.unwrap();
        store.add_point("k1", 100, 3.5).await.unwrap();

        let points = store
            .range_query("k1", 0, 200, Aggregation::Last, 1)
            .await
            .unwrap();
        assert_eq!(points, vec![RawPoint::new(100, "3.5")]);
    }

    #[tokio::test]
    async fn test_keys_matching_substring() {
        let store = MemoryStore::new();
        store.create_key("sensor_a").await.unwrap();
        store.create_key("sensor_b").await.unwrap();
        store.create_key("other").await.unwrap();

        let keys = store.keys_matching("sensor").await.unwrap();
        assert_eq!(keys, vec!["sensor_a", "sensor_b"]);

        let all = store.keys_matching("").await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_format_literal() {
        assert_eq!(format_literal(42.0), "42");
        assert_eq!(format_literal(-7.0), "-7");
        assert_eq!(format_literal(3.5), "3.5");
        assert_eq!(format_literal(0.25), "0.25");
    }
}
