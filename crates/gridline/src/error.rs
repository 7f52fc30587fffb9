//! Error types for the data-grid engine.
//!
//! Only configuration problems are errors. They are detected when a view is
//! created or handed new columns or data, and they are fatal to that call.
//! Per-cell extraction failures are [`ExtractError`]s and are absorbed by the
//! pipeline. Stale or out-of-range transition inputs are ignored or clamped.

use std::path::PathBuf;

use crate::model::RowKey;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors surfaced at setup time.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A view needs at least one column.
    #[error("A view needs at least one column")]
    NoColumns,

    /// Two columns resolve to the same identity.
    #[error("Duplicate column id '{id}'")]
    DuplicateColumn { id: String },

    /// A column has an empty identity.
    #[error("Column at position {index} has an empty id")]
    EmptyColumnId { index: usize },

    /// The row key strategy produced no key for a row.
    #[error("Row {row} has no usable key: {strategy}")]
    UnresolvedRowKey { row: usize, strategy: String },

    /// Two rows of the same dataset share a key.
    #[error("Duplicate row key '{key}'")]
    DuplicateRowKey { key: RowKey },

    /// A column accessor failed on every row of the dataset.
    #[error("Accessor for column '{column}' failed on every row: {message}")]
    AccessorFailed { column: String, message: String },

    /// Page size must be positive.
    #[error("Invalid page size {size}: must be greater than zero")]
    InvalidPageSize { size: usize },

    /// Page size options must be non-empty and positive.
    #[error("Invalid page size options {options:?}: expected a non-empty list of positive sizes")]
    InvalidPageSizeOptions { options: Vec<usize> },

    /// View options could not be parsed from TOML.
    #[error("Invalid view options: {0}")]
    Config(#[from] toml::de::Error),

    /// View options could not be parsed from JSON.
    #[error("Invalid view options: {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// View options file could not be read.
    #[error("Failed to read view options '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a duplicate column error.
    pub fn duplicate_column(id: impl Into<String>) -> Self {
        Self::DuplicateColumn { id: id.into() }
    }

    /// Create an accessor failure error.
    pub fn accessor_failed(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AccessorFailed {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A recoverable failure to extract one cell.
///
/// The pipeline treats the cell as [`CellValue::None`](crate::CellValue::None).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The row has no field with this name.
    #[error("Field '{field}' is missing")]
    MissingField { field: String },

    /// A computed accessor rejected the row.
    #[error("{message}")]
    Failed { message: String },
}

impl ExtractError {
    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a computed accessor failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}
