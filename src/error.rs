//! Error types for table loading, transformation and export

use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the loader, the writer and the table operations
#[derive(Error, Debug)]
pub enum Error {
    /// Wrong shape for an argument, mapping document, encoding or file format
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File not found, unreadable or unwritable
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed delimited content or mapping document
    #[error("Parse error in {}{}: {message}", path.display(), line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Parse {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    /// A referenced column is absent from a table
    #[error("Unknown column '{column}' (available: {})", available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    /// Not enough inputs for the operation
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Inputs to a strict fusion do not share a column set
    #[error("Schema mismatch: expected columns [{}], found [{}]", expected.join(", "), found.join(", "))]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl Error {
    /// Create an I/O error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for a path
    pub fn parse(path: impl Into<PathBuf>, line: Option<u64>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an unknown-column error listing the columns that do exist
    pub fn unknown_column<'a>(
        column: impl Into<String>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            available: available.into_iter().map(str::to_string).collect(),
        }
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
