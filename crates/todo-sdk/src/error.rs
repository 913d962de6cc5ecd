//! Error types for the todo SDK.

use thiserror::Error;

/// SDK operation errors
#[derive(Debug, Error)]
pub enum SdkError {
    /// The endpoint is not a valid URI
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Connection error (network, DNS, etc.)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The server rejected the request arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Any other gRPC failure
    #[error("gRPC error: {0}")]
    GrpcError(String),

    /// The server answered with something this client cannot interpret
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<tonic::Status> for SdkError {
    fn from(status: tonic::Status) -> Self {
        use tonic::Code;

        match status.code() {
            Code::InvalidArgument => SdkError::InvalidArgument(status.message().to_string()),
            Code::Unavailable => SdkError::ConnectionError(format!("gRPC unavailable: {}", status.message())),
            Code::DeadlineExceeded => SdkError::ConnectionError("Request timeout".to_string()),
            _ => SdkError::GrpcError(format!("{}: {}", status.code(), status.message())),
        }
    }
}

impl From<tonic::transport::Error> for SdkError {
    fn from(e: tonic::transport::Error) -> Self {
        SdkError::ConnectionError(e.to_string())
    }
}
