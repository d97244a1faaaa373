//! Range Queries
//!
//! Read-side shaping: one bounded, bucket-aggregated store read per
//! request, reshaped into the parallel sequences the wire format expects.

pub mod range;

pub use range::{RangeQuery, RangeResult, ResultTimestamp, ResultValue, TimestampFormat};
