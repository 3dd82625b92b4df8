//! Labeling error types

use thiserror::Error;

/// Result type alias for labeling operations
pub type LabelResult<T> = std::result::Result<T, LabelError>;

/// Labeling-specific error types
#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Invalid label definition: {0}")]
    InvalidLabelDefinition(String),

    #[error("Invalid command object: {0}")]
    InvalidCommandObject(String),

    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    #[error("Substring automaton error: {0}")]
    AhoCorasick(#[from] aho_corasick::BuildError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LabelError {
    pub(crate) fn definition(message: impl Into<String>) -> Self {
        Self::InvalidLabelDefinition(message.into())
    }
}
