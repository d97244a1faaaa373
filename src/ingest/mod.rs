//! Ingest Pipeline
//!
//! Shapes a raw request body into store writes in three stages, each a
//! hard gate: schema extraction, timestamp/value normalization, then the
//! per-point batch write with independent success/failure accounting.

pub mod normalize;
pub mod schema;
pub mod writer;

pub use normalize::PointBatch;
pub use schema::RawBatch;
pub use writer::WriteOutcome;

use thiserror::Error;

/// Validation failures raised by the ingest gates.
///
/// Each gate short-circuits the rest of the pipeline; a batch is never
/// partially normalized. The display strings double as the client-facing
/// messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Body lacked the `timestamps`/`values` pair
    #[error("Invalid schema submitted.")]
    InvalidSchema,

    /// A textual timestamp could not be parsed as ISO-8601
    #[error("Failed to convert date-time strings to timestamps.")]
    TimestampConversion,

    /// A timestamp element was not numeric after conversion
    #[error("Invalid timestamps.")]
    InvalidTimestamps,

    /// A value element was not numeric
    #[error("Invalid values.")]
    InvalidValues,

    /// `timestamps` and `values` differ in length
    #[error("Invalid number of timestamps and values.")]
    LengthMismatch,

    /// Batch exceeds the configured point cap
    #[error("Batch exceeds the maximum of {limit} points.")]
    BatchTooLarge { limit: usize },
}
