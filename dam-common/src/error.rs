//! Common error types for the DAM tools

use thiserror::Error;

use crate::record::RecordError;

/// Common result type for DAM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the DAM tools
#[derive(Error, Debug)]
pub enum Error {
    /// A record field rejected a value (type, length, or range violation)
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// A row of a CSV/TSV file failed validation
    #[error("Line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: RecordError,
    },

    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV/TSV reading or writing error
    #[error("Tabular file error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
