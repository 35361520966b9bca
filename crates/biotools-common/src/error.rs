//! Error types for BioTools

use thiserror::Error;

/// Result type alias for BioTools operations
pub type Result<T> = std::result::Result<T, BioToolsError>;

/// Main error type for BioTools
///
/// Only whole-operation failures are reported through this type. A single
/// gene or protein that cannot be looked up is recorded in the operation's
/// result instead.
#[derive(Error, Debug)]
pub enum BioToolsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Invalid extraction kind, taxid mode, missing column, retry count, ...
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl BioToolsError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Whether this error was raised by argument or schema validation
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
