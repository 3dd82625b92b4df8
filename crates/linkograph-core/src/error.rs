//! Error types for Linkograph Core

use thiserror::Error;

/// Result type alias using the core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid enumeration: ({length}, {code}) does not correspond to a linkograph")]
    InvalidEnumeration { length: usize, code: String },

    #[error("Linkograph sizes differ: {left} != {right}")]
    SizeMismatch { left: usize, right: usize },

    #[error("Class index {digit} out of range ({available} classes available)")]
    ClassOutOfRange { digit: usize, available: usize },

    #[error("Invalid linkograph wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Limit exceeded: {0}")]
    Limit(#[from] crate::limits::LimitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
