//! gRPC service implementation
//!
//! Implements the ToDoService trait generated from proto definitions. Each
//! call is a self-contained store round trip; the only shared state is the
//! store handle.

use std::sync::Arc;
use std::time::Duration;

use tokio_stream::StreamExt;
use tonic::{Request, Response, Status};
use todo_domain::DocumentStore;

use crate::conversions::{
    criteria_from_proto, document_to_record, parse_id, record_to_document, record_to_update,
};
use crate::error::ServiceError;
use crate::health::{LivenessProber, ProbeError};
use crate::proto::to_do_service_server::ToDoService;
use crate::proto::*;
use crate::query::build_filter;

/// Record operations over a shared document store
pub struct RecordService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> Clone for RecordService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore + 'static> RecordService<S> {
    /// Create a new service instance
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Liveness prober that pings the store, failing after `timeout`
    pub fn liveness_prober(&self, timeout: Duration) -> LivenessProber {
        let store = Arc::clone(&self.store);
        LivenessProber::new(move || {
            let store = Arc::clone(&store);
            async move {
                match tokio::time::timeout(timeout, store.ping()).await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(ProbeError::new(e)),
                    Err(_) => Err(ProbeError::new(format!("store ping timed out after {:?}", timeout))),
                }
            }
        })
    }

    /// Release the store connection; calling it twice is harmless
    pub async fn close(&self) -> Result<(), ServiceError> {
        self.store.close().await.map_err(ServiceError::storage)
    }

    /// Insert a record and return its store-assigned identifier
    pub async fn create_record(&self, record: ToDo) -> Result<String, ServiceError> {
        let document = record_to_document(record);
        let id = self
            .store
            .insert_one(document)
            .await
            .map_err(ServiceError::storage)?
            .ok_or_else(|| ServiceError::Invariant("store returned no usable key".to_string()))?;

        tracing::debug!(%id, "created todo");
        Ok(id.to_string())
    }

    /// Fetch a record; `Ok(None)` when no record has this identifier
    pub async fn read_record(&self, id: &str) -> Result<Option<ToDo>, ServiceError> {
        let id = parse_id(id)?;
        let document = self.store.find_one(id).await.map_err(ServiceError::storage)?;

        tracing::debug!(%id, found = document.is_some(), "read todo");
        Ok(document.map(document_to_record))
    }

    /// Apply a partial update; returns how many records changed (0 or 1)
    pub async fn update_record(&self, record: ToDo) -> Result<u64, ServiceError> {
        let (id, update) = record_to_update(record)?;
        let updated = self
            .store
            .update_one(id, &update)
            .await
            .map_err(ServiceError::storage)?;

        tracing::debug!(%id, updated, "updated todo");
        Ok(updated)
    }

    /// Remove a record; returns how many records were removed (0 or 1)
    pub async fn delete_record(&self, id: &str) -> Result<u64, ServiceError> {
        let id = parse_id(id)?;
        let deleted = self.store.delete_one(id).await.map_err(ServiceError::storage)?;

        tracing::debug!(%id, deleted, "deleted todo");
        Ok(deleted)
    }

    /// Every record matching the request, in store order
    pub async fn search_records(&self, request: SearchRequest) -> Result<Vec<ToDo>, ServiceError> {
        let criteria = criteria_from_proto(request);
        let filter = build_filter(&criteria)?;
        tracing::info!(%filter, "searching todos");

        let mut stream = self.store.find(filter).await.map_err(ServiceError::storage)?;
        let mut records = Vec::new();
        while let Some(document) = stream.next().await {
            let document = document.map_err(ServiceError::storage)?;
            tracing::debug!(?document, "matched todo");
            records.push(document_to_record(document));
        }

        Ok(records)
    }
}

#[tonic::async_trait]
impl<S> ToDoService for RecordService<S>
where
    S: DocumentStore + 'static,
{
    async fn create(
        &self,
        request: Request<CreateRequest>,
    ) -> Result<Response<CreateResponse>, Status> {
        let record = request
            .into_inner()
            .to_do
            .ok_or(ServiceError::MissingField("to_do"))?;

        let id = self.create_record(record).await?;
        Ok(Response::new(CreateResponse { id }))
    }

    async fn read(
        &self,
        request: Request<ReadRequest>,
    ) -> Result<Response<ReadResponse>, Status> {
        let req = request.into_inner();
        let to_do = self.read_record(&req.id).await?;
        Ok(Response::new(ReadResponse { to_do }))
    }

    async fn update(
        &self,
        request: Request<UpdateRequest>,
    ) -> Result<Response<UpdateResponse>, Status> {
        let record = request
            .into_inner()
            .to_do
            .ok_or(ServiceError::MissingField("to_do"))?;

        let updated = self.update_record(record).await?;
        Ok(Response::new(UpdateResponse {
            updated: updated as i64,
        }))
    }

    async fn delete(
        &self,
        request: Request<DeleteRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        let req = request.into_inner();
        let deleted = self.delete_record(&req.id).await?;
        Ok(Response::new(DeleteResponse {
            deleted: deleted as i64,
        }))
    }

    async fn search(
        &self,
        request: Request<SearchRequest>,
    ) -> Result<Response<SearchResponse>, Status> {
        let to_dos = self.search_records(request.into_inner()).await?;
        Ok(Response::new(SearchResponse { to_dos }))
    }
}
