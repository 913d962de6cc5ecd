//! Error types for the service and the server lifecycle

use thiserror::Error;
use todo_domain::InvalidDocumentId;
use tonic::Status;

/// Errors returned by record operations
///
/// "Not found" and "nothing changed" are successful results, never errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller-supplied identifier does not decode into a store key
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] InvalidDocumentId),

    /// Search pattern is not a valid regular expression
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Request message omitted a required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The store round trip failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// A collaborator broke its contract
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

impl ServiceError {
    /// Wrap a store error
    pub fn storage(err: impl std::fmt::Display) -> Self {
        ServiceError::Storage(err.to_string())
    }
}

impl From<ServiceError> for Status {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::InvalidIdentifier(_)
            | ServiceError::InvalidPattern(_)
            | ServiceError::MissingField(_) => Status::invalid_argument(err.to_string()),
            ServiceError::Storage(_) | ServiceError::Invariant(_) => Status::internal(err.to_string()),
        }
    }
}

/// Errors from the server lifecycle
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound; fatal at startup
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Accepting a connection failed; serving stopped
    #[error("Accept loop failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The transport failed while serving
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// A background task panicked or was aborted
    #[error("Server task failed: {0}")]
    Task(String),
}
