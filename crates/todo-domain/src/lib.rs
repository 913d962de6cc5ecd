//! Todo Domain Layer
//!
//! Core types and trait seams for the todo service. Nothing in here performs
//! I/O; store and transport implementations live in other crates.
//!
//! ## Key Concepts
//!
//! - **Document**: the persisted shape of a todo item
//! - **DocumentId**: store-assigned key, rendered as 32 hex characters on the wire
//! - **State**: lifecycle stage (not started → in progress → done), persisted by name
//! - **Filter**: conjunctive predicate used by search
//! - **DocumentStore**: the CRUD + query contract every store implements

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod build_info;
pub mod document;
pub mod filter;
pub mod state;
pub mod traits;

// Re-exports for convenience
pub use build_info::BuildInfo;
pub use document::{Document, DocumentId, DocumentUpdate, InvalidDocumentId};
pub use filter::{Clause, Filter, SearchCriteria};
pub use state::State;
pub use traits::{DocumentStore, DocumentStream};
