//! Trait definitions for external interactions
//!
//! These traits define the boundary between the service layer and the
//! document store. Implementations live in `todo-store`.

use std::pin::Pin;

use async_trait::async_trait;
use tokio_stream::Stream;

use crate::{Document, DocumentId, DocumentUpdate, Filter};

/// Lazy, finite, non-restartable sequence of search results
pub type DocumentStream<E> = Pin<Box<dyn Stream<Item = Result<Document, E>> + Send + 'static>>;

/// Trait for storing and retrieving todo documents
///
/// Implementations must be safe for concurrent use: the service shares one
/// store between every in-flight call and adds no locking of its own.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert a new document and return the key the store assigned
    ///
    /// Any `id` already set on `document` is ignored. `Ok(None)` means the
    /// write went through but no usable key came back.
    async fn insert_one(&self, document: Document) -> Result<Option<DocumentId>, Self::Error>;

    /// Get a document by key
    async fn find_one(&self, id: DocumentId) -> Result<Option<Document>, Self::Error>;

    /// Apply a partial update to the document with this key
    ///
    /// Returns the number of documents written (0 or 1).
    async fn update_one(&self, id: DocumentId, update: &DocumentUpdate) -> Result<u64, Self::Error>;

    /// Remove the document with this key
    ///
    /// Returns the number of documents removed (0 or 1).
    async fn delete_one(&self, id: DocumentId) -> Result<u64, Self::Error>;

    /// Stream every document matching the filter, in store default order
    async fn find(&self, filter: Filter) -> Result<DocumentStream<Self::Error>, Self::Error>;

    /// Check connectivity
    async fn ping(&self) -> Result<(), Self::Error>;

    /// Release the underlying connection
    ///
    /// Closing twice is a no-op.
    async fn close(&self) -> Result<(), Self::Error>;
}
