#![warn(missing_docs)]

//! Todo gRPC Service Layer
//!
//! Exposes the todo store over gRPC.
//! Implements:
//! - Create/Read/Update/Delete/Search over `todo.v1.ToDoService`
//! - The standard `grpc.health.v1.Health` liveness probe
//! - Server lifecycle: bind, serve in the background, drain on shutdown

// Include generated protobuf code
pub mod proto {
    //! Generated protobuf types and service definitions
    tonic::include_proto!("todo.v1");

    pub mod health {
        //! Generated `grpc.health.v1` types and service definitions
        tonic::include_proto!("grpc.health.v1");
    }
}

pub mod conversions;
pub mod error;
pub mod health;
pub mod query;
pub mod server;
pub mod service;
pub mod shutdown;

pub use error::{ServerError, ServiceError};
pub use health::{LivenessProber, ProbeError, ProbeOutcome};
pub use server::{start_server, ServerConfig, ServingServer};
pub use service::RecordService;
pub use shutdown::ShutdownSignal;
