//! Error types for the addressing and grid engine.

use thiserror::Error;

/// Errors raised by address parsing, range writes and header lookups.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error(
        "Dimension mismatch! Value - rows: {value_rows}, columns: {value_cols}. \
         Range - rows: {range_rows}, columns: {range_cols}"
    )]
    DimensionMismatch {
        value_rows: usize,
        value_cols: usize,
        range_rows: usize,
        range_cols: usize,
    },

    #[error("{0} is not a valid header")]
    HeaderNotFound(String),

    #[error("No header rows present")]
    NoHeaders,

    #[error("{0} is not supported")]
    UnsupportedOperand(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
