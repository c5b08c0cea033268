//! Error types for QVX write operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::FieldAttrType;

/// Errors that can occur when building a QVX header or writing a QVX file.
///
/// Every variant is fatal for the write in progress. Nothing is retried and
/// partially written files are left in place.
#[derive(Debug, Error)]
pub enum QvxError {
    /// Column type has no QVX mapping, or needs an unsupported width.
    #[error("unsupported type for column '{column}': {message}")]
    UnsupportedType { column: String, message: String },

    /// Cell text could not be parsed into the field's representation.
    #[error("malformed value '{value}' for field '{field}'{}: {reason}", row_suffix(.row))]
    MalformedValue {
        field: String,
        row: Option<usize>,
        value: String,
        reason: String,
    },

    /// A code page other than the single-byte default was requested.
    #[error("code page {code_page} is not supported (field '{field}')")]
    UnsupportedEncoding { field: String, code_page: u32 },

    /// Temporal conversion called for a non-temporal attribute type.
    #[error("no temporal conversion for field attribute type {subtype}")]
    UnknownAttributeSubtype { subtype: FieldAttrType },

    /// Row has a different number of cells than the table has columns.
    #[error("row {row}: expected {expected} cells, got {actual}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Header document could not be rendered.
    #[error("failed to serialize table header: {message}")]
    HeaderSerialization { message: String },

    /// Write was cancelled between rows.
    #[error("write cancelled after {rows_written} rows")]
    Cancelled { rows_written: usize },

    /// Destination exists and the overwrite policy is abort.
    #[error("file already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// Destination cannot be used as a QVX output file.
    #[error("invalid destination {path}: {reason}")]
    InvalidDestination { path: PathBuf, reason: String },

    /// Settings file could not be parsed or rendered.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// I/O error on the output sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for QVX operations.
pub type Result<T> = std::result::Result<T, QvxError>;

fn row_suffix(row: &Option<usize>) -> String {
    row.map(|idx| format!(" at row {idx}")).unwrap_or_default()
}

impl QvxError {
    /// Create an UnsupportedType error.
    pub fn unsupported_type(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedType {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a MalformedValue error without row context.
    pub fn malformed_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedValue {
            field: field.into(),
            row: None,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedEncoding error.
    pub fn unsupported_encoding(field: impl Into<String>, code_page: u32) -> Self {
        Self::UnsupportedEncoding {
            field: field.into(),
            code_page,
        }
    }

    /// Create a HeaderSerialization error.
    pub fn header_serialization(message: impl Into<String>) -> Self {
        Self::HeaderSerialization {
            message: message.into(),
        }
    }

    /// Create an InvalidDestination error.
    pub fn invalid_destination(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidDestination {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Attach the row index to a MalformedValue error; other errors pass through.
    #[must_use]
    pub fn at_row(self, index: usize) -> Self {
        match self {
            Self::MalformedValue {
                field,
                value,
                reason,
                ..
            } => Self::MalformedValue {
                field,
                row: Some(index),
                value,
                reason,
            },
            other => other,
        }
    }
}
