//! Error types for duplicate marking
//!
//! Only failures of the record model and the grouping contract live here.
//! Container-level I/O failures are reported through `anyhow` by the binary.

use std::io;
use thiserror::Error;

/// Result type alias for lrmarkdup operations
pub type Result<T> = std::result::Result<T, MarkdupError>;

#[derive(Error, Debug)]
pub enum MarkdupError {
    /// Input is not ordered by (reference id, reference start)
    #[error(
        "input is not coordinate-sorted: record {index} at {current:?} follows {previous:?}"
    )]
    UnsortedInput {
        index: u64,
        previous: (usize, u64),
        current: (usize, u64),
    },

    /// A mapped record is missing a coordinate needed for grouping
    #[error("record '{name}' is mapped but has no {field}")]
    MissingCoordinates { name: String, field: &'static str },

    #[error("invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}
