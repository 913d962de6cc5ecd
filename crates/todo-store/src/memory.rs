//! In-process document store
//!
//! Keeps documents in a map keyed by their UUIDv7 key, so iteration order is
//! insertion order. Filters are evaluated with `Filter::matches`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use todo_domain::{Document, DocumentId, DocumentStore, DocumentStream, DocumentUpdate, Filter};

/// Errors raised by [`MemoryStore`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryStoreError {
    /// The store was switched offline
    #[error("Store is offline")]
    Offline,

    /// The store was closed
    #[error("Store is closed")]
    Closed,

    /// A previous operation panicked while holding the map
    #[error("Store lock poisoned")]
    Poisoned,
}

/// In-memory implementation of `DocumentStore`
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<DocumentId, Document>>,
    offline: AtomicBool,
    closed: AtomicBool,
    round_trips: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following operation fail (or succeed again)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of operations that reached the store
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count the round trip and hand out the map
    fn enter(&self) -> Result<MutexGuard<'_, BTreeMap<DocumentId, Document>>, MemoryStoreError> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        if self.closed.load(Ordering::SeqCst) {
            return Err(MemoryStoreError::Closed);
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(MemoryStoreError::Offline);
        }
        self.documents.lock().map_err(|_| MemoryStoreError::Poisoned)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn insert_one(&self, mut document: Document) -> Result<Option<DocumentId>, Self::Error> {
        let mut documents = self.enter()?;
        let id = DocumentId::new();
        document.id = Some(id);
        documents.insert(id, document);
        Ok(Some(id))
    }

    async fn find_one(&self, id: DocumentId) -> Result<Option<Document>, Self::Error> {
        let documents = self.enter()?;
        Ok(documents.get(&id).cloned())
    }

    async fn update_one(&self, id: DocumentId, update: &DocumentUpdate) -> Result<u64, Self::Error> {
        let mut documents = self.enter()?;
        match documents.get_mut(&id) {
            Some(document) => {
                update.apply_to(document);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, id: DocumentId) -> Result<u64, Self::Error> {
        let mut documents = self.enter()?;
        Ok(u64::from(documents.remove(&id).is_some()))
    }

    async fn find(&self, filter: Filter) -> Result<DocumentStream<Self::Error>, Self::Error> {
        let documents = self.enter()?;
        let matches: Vec<Result<Document, MemoryStoreError>> = documents
            .values()
            .filter(|document| filter.matches(document))
            .cloned()
            .map(Ok)
            .collect();
        Ok(Box::pin(tokio_stream::iter(matches)))
    }

    async fn ping(&self) -> Result<(), Self::Error> {
        self.enter().map(|_| ())
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
