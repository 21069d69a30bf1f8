//! Error type for the columnar kernel.
//!
//! Kernel operations return [`Result<T>`](crate::Result), whose error side is
//! [`ColumnError`]. Operator/type mismatches during reduction are *not* errors:
//! they are logged and resolved with a first-value fallback.

use std::io;

use thiserror::Error;

use crate::types::LogicalType;

/// Failures reported by column, table and serialization operations.
#[derive(Debug, Error)]
pub enum ColumnError {
    /// Element access past the end of a column.
    #[error("row {index} is out of range for a column of {len} rows")]
    OutOfRange { index: usize, len: usize },

    /// The factory cannot build a column of `to` from a column of `from`.
    #[error("cannot build a {to} column from a {from} column")]
    IncompatibleType { from: LogicalType, to: LogicalType },

    /// Two columns (or a column and a row-id bundle) disagree on length.
    #[error("length mismatch: expected {expected} rows, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// A boundary array does not partition the column it was applied to.
    #[error("invalid boundaries: {0}")]
    InvalidBoundaries(String),

    /// A reorder permutation is not a permutation of the column's rows.
    #[error("invalid permutation: {0}")]
    InvalidPermutation(String),

    /// Two grouped tables cannot be combined.
    #[error("tables cannot be merged: {0}")]
    NotMergeable(String),

    /// The output stream failed part-way; `written` elements made it out.
    #[error("write failed after {written} elements")]
    Write {
        written: usize,
        #[source]
        source: io::Error,
    },
}

impl ColumnError {
    /// Number of elements written before a serialization failure, if this is one.
    #[must_use]
    pub const fn written(&self) -> Option<usize> {
        match self {
            Self::Write { written, .. } => Some(*written),
            _ => None,
        }
    }
}

/// Shorthand for kernel results.
pub type Result<T> = std::result::Result<T, ColumnError>;
