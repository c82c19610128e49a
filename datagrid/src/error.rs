//! Error types

use crate::model::RowId;

/// Errors produced by validating constructors and lookups.
///
/// The recompute pipeline itself never fails: setters on the data source and
/// the grid consume these errors, log them and keep their previous state.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GridError {
    /// A page size of zero.
    #[error("Invalid page size {size}: must be greater than zero")]
    InvalidPageSize { size: usize },

    /// A sort direction other than `asc` or `desc`.
    #[error("Invalid sort direction '{direction}': expected 'asc' or 'desc'")]
    InvalidSortDirection { direction: String },

    /// A sort descriptor without an `active` field.
    #[error("Sort descriptor has no active field")]
    MissingSortField,

    /// A row id that is not part of the current row set.
    #[error("Row {id} is not part of the current row set")]
    UnknownRow { id: RowId },

    /// A column index outside the column set.
    #[error("Column {index} does not exist (have {count} columns)")]
    UnknownColumn { index: usize, count: usize },

    /// Ingested JSON was not an object (or an array of objects).
    #[error("Expected a JSON object, got {actual}")]
    Json { actual: &'static str },
}

impl GridError {
    /// Creates a new invalid page size error.
    pub fn invalid_page_size(size: usize) -> Self {
        Self::InvalidPageSize { size }
    }

    /// Creates a new invalid sort direction error.
    pub fn invalid_sort_direction(direction: impl Into<String>) -> Self {
        Self::InvalidSortDirection {
            direction: direction.into(),
        }
    }

    /// Creates a new unknown column error.
    pub fn unknown_column(index: usize, count: usize) -> Self {
        Self::UnknownColumn { index, count }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
