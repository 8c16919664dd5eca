//! Error types for range operations.

use polars::prelude::PolarsError;
use std::fmt;
use thiserror::Error;

/// Failure of a single-interval transformation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("width {width} is negative")]
    NegativeWidth { width: i64 },

    #[error("strand required for {direction} movement")]
    MissingStrand { direction: &'static str },
}

/// A row that failed a rowwise transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFailure {
    pub row: usize,
    pub error: GeometryError,
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.error)
    }
}

/// Errors that can occur while building or transforming range collections.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangesError {
    #[error("invalid geometry in {} row(s), first {}", .failures.len(), first_failure(.failures))]
    InvalidGeometry { failures: Vec<RowFailure> },

    #[error("{operation} requires strand information but the collection has none")]
    MissingStrand { operation: &'static str },

    #[error("column '{column}' is {left} on one side and {right} on the other")]
    SchemaMismatch {
        column: String,
        left: String,
        right: String,
    },

    #[error("{what} has {found} rows, expected {expected}")]
    LengthMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("column '{column}' is {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("hit ({query}, {subject}) is out of bounds for {query_len} query and {subject_len} subject rows")]
    HitOutOfBounds {
        query: usize,
        subject: usize,
        query_len: usize,
        subject_len: usize,
    },

    #[error("invalid interval [{start}, {end}]: end is before start - 1")]
    InvalidInterval { start: i64, end: i64 },

    /// Failure reported by the polars frame backing the metadata.
    #[error("metadata frame error: {0}")]
    Frame(String),
}

impl From<PolarsError> for RangesError {
    fn from(err: PolarsError) -> Self {
        RangesError::Frame(err.to_string())
    }
}

fn first_failure(failures: &[RowFailure]) -> String {
    failures
        .first()
        .map(|f| f.to_string())
        .unwrap_or_else(|| "none".to_string())
}

pub type Result<T> = std::result::Result<T, RangesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_message_names_first_row() {
        let err = RangesError::InvalidGeometry {
            failures: vec![
                RowFailure {
                    row: 3,
                    error: GeometryError::NegativeWidth { width: -2 },
                },
                RowFailure {
                    row: 7,
                    error: GeometryError::NegativeWidth { width: -1 },
                },
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("2 row(s)"));
        assert!(msg.contains("row 3: width -2 is negative"));
    }
}
