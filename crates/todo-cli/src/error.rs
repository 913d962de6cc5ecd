//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// SDK error
    #[error("SDK error: {0}")]
    Sdk(#[from] todo_sdk::SdkError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No todo has the requested ID
    #[error("Todo not found: {0}")]
    NotFound(String),
}
