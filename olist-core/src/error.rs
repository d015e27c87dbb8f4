//! Error types for the olist crates.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for loading and deriving Olist tables.
#[derive(Debug, Error)]
pub enum OlistError {
    #[error("CSV directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("CSV file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Missing table after load: {name}")]
    MissingTable { name: String },

    #[error("Column '{column}' not found (available: {available})")]
    ColumnNotFound { column: String, available: String },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl OlistError {
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn missing_table(name: impl Into<String>) -> Self {
        Self::MissingTable { name: name.into() }
    }

    pub fn column_not_found(column: &str, available: &[String]) -> Self {
        Self::ColumnNotFound {
            column: column.to_string(),
            available: available.join(", "),
        }
    }
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, OlistError>;
