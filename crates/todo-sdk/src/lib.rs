//! Todo Rust SDK
//!
//! Async client for the todo gRPC service.
//!
//! # Example
//!
//! ```no_run
//! use todo_sdk::{Todo, ToDoClient};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), todo_sdk::SdkError> {
//! let mut client = ToDoClient::connect("http://localhost:8080")
//!     .await?
//!     .with_timeout(Duration::from_secs(3));
//!
//! let id = client.create(&Todo::new("write the release notes")).await?;
//! let todo = client.read(&id).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod error;
mod todo;

pub use client::{HealthStatus, ToDoClient};
pub use error::SdkError;
pub use todo::Todo;
