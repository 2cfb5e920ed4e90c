//! Error types for delimited-text ingestion.

use std::path::PathBuf;
use thiserror::Error;

use delimit_model::ModelError;

/// Errors that end an operation.
///
/// Issues attributable to a single value or row are reported as warnings
/// instead; only configuration, opening, and strict typed access fail.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Configuration Errors ===
    /// Delimiter, qualifier, or escape character choices are invalid.
    #[error("invalid reader configuration: {message}")]
    Configuration { message: String },

    /// A column definition is invalid.
    #[error("invalid column '{column}': {source}")]
    Model {
        column: String,
        #[source]
        source: ModelError,
    },

    // === Source Errors ===
    /// The source could not be opened.
    #[error("could not open {description}: {source}")]
    Open {
        description: String,
        #[source]
        source: std::io::Error,
    },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Code page label is not known.
    #[error("unknown encoding '{label}'")]
    UnknownEncoding { label: String },

    /// Read failure outside a row scan.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The source cannot be rewound and there is no way to reopen it.
    #[error("source cannot be rewound and no opener is available")]
    NotRewindable,

    // === Access Errors ===
    /// An operation needs an open reader.
    #[error("reader is not open")]
    NotOpen,

    /// No current record to read values from.
    #[error("no current record; call read() first")]
    NoCurrentRecord,

    /// Ordinal outside the schema.
    #[error("column ordinal {ordinal} is out of range (field count {field_count})")]
    ColumnOutOfRange { ordinal: usize, field_count: usize },

    /// Strict typed access found a value that does not convert.
    #[error("{message}")]
    Format {
        ordinal: usize,
        column: String,
        message: String,
    },
}

impl IngestError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/orders.csv"),
        };
        assert_eq!(err.to_string(), "file not found: /data/orders.csv");
    }

    #[test]
    fn test_format_error_carries_message() {
        let err = IngestError::Format {
            ordinal: 2,
            column: "Qty".to_string(),
            message: "'x' is not an integer".to_string(),
        };
        assert_eq!(err.to_string(), "'x' is not an integer");
    }
}
