//! Error types for skyglass

use thiserror::Error;

/// Main error type for skyglass operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A mesh record could not be parsed. `line` is 1-based.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Transform stack underflow: pop on an empty stack")]
    StackUnderflow,

    #[error("Transform stack overflow: capacity of {capacity} exceeded")]
    StackOverflow { capacity: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Build a parse error for the given 1-based line number
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for skyglass operations
pub type Result<T> = std::result::Result<T, Error>;
