//! Error types for Tabula core.

use tabula_engine::engine::GridError;
use thiserror::Error;

/// Errors that can occur while building, transforming or loading tables
#[derive(Error, Debug)]
pub enum TabulaError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No table named {0}")]
    TableNotFound(String),

    #[error("Table is empty")]
    EmptyTable,
}

pub type Result<T> = std::result::Result<T, TabulaError>;
