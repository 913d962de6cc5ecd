//! Todo client implementation.

use std::time::Duration;

use crate::error::SdkError;
use crate::todo::Todo;
use todo_domain::State;
use todo_grpc::conversions::state_to_proto;
use todo_grpc::health::PROBE_FAILURE_HEADER;
use todo_grpc::proto::health::health_check_response::ServingStatus;
use todo_grpc::proto::health::health_client::HealthClient;
use todo_grpc::proto::health::HealthCheckRequest;
use todo_grpc::proto::to_do_service_client::ToDoServiceClient;
use todo_grpc::proto::{
    CreateRequest, DeleteRequest, ReadRequest, SearchRequest, UpdateRequest,
};
use tonic::transport::{Channel, Endpoint};
use tonic::Request;

/// Answer of the liveness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    /// Serving status name, e.g. `SERVING`
    pub status: String,
    /// Why the probe failed, when the server said so
    pub failure: Option<String>,
}

impl HealthStatus {
    /// Whether the server reported SERVING
    pub fn is_serving(&self) -> bool {
        self.status == ServingStatus::Serving.as_str_name()
    }
}

/// Todo SDK client
#[derive(Debug, Clone)]
pub struct ToDoClient {
    service: ToDoServiceClient<Channel>,
    health: HealthClient<Channel>,
    timeout: Option<Duration>,
}

impl ToDoClient {
    /// Connect to a server, e.g. `http://localhost:8080`
    pub async fn connect(endpoint: impl Into<String>) -> Result<Self, SdkError> {
        let endpoint = Endpoint::from_shared(endpoint.into())
            .map_err(|e| SdkError::InvalidEndpoint(e.to_string()))?;
        let channel = endpoint.connect().await?;
        Ok(Self::from_channel(channel))
    }

    /// Wrap an already established channel
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            service: ToDoServiceClient::new(channel.clone()),
            health: HealthClient::new(channel),
            timeout: None,
        }
    }

    /// Apply a deadline to every call made through this client
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        if let Some(timeout) = self.timeout {
            request.set_timeout(timeout);
        }
        request
    }

    /// Create a todo and return its identifier
    pub async fn create(&mut self, todo: &Todo) -> Result<String, SdkError> {
        let request = self.request(CreateRequest {
            to_do: Some(todo.to_proto()),
        });
        let response = self.service.create(request).await?;
        Ok(response.into_inner().id)
    }

    /// Fetch a todo; `None` when nothing has this identifier
    pub async fn read(&mut self, id: &str) -> Result<Option<Todo>, SdkError> {
        let request = self.request(ReadRequest { id: id.to_string() });
        let response = self.service.read(request).await?;
        Ok(response.into_inner().to_do.map(Todo::from_proto))
    }

    /// Update the todo named by `todo.id`
    ///
    /// Empty title and description and a missing reminder keep the stored
    /// values. Returns whether a record was updated.
    pub async fn update(&mut self, todo: &Todo) -> Result<bool, SdkError> {
        let request = self.request(UpdateRequest {
            to_do: Some(todo.to_proto()),
        });
        let response = self.service.update(request).await?;
        Ok(response.into_inner().updated > 0)
    }

    /// Delete a todo; returns whether one was removed
    pub async fn delete(&mut self, id: &str) -> Result<bool, SdkError> {
        let request = self.request(DeleteRequest { id: id.to_string() });
        let response = self.service.delete(request).await?;
        Ok(response.into_inner().deleted > 0)
    }

    /// Search by description pattern, required tags and allowed states
    ///
    /// Unrecognised state names are sent as `NOT_STARTED`.
    pub async fn search(
        &mut self,
        pattern: Option<&str>,
        tags: &[String],
        states: &[String],
    ) -> Result<Vec<Todo>, SdkError> {
        let states = states
            .iter()
            .map(|name| state_to_proto(State::from_name_or_default(name)) as i32)
            .collect();

        let request = self.request(SearchRequest {
            pattern: pattern.unwrap_or_default().to_string(),
            tags: tags.to_vec(),
            states,
        });
        let response = self.service.search(request).await?;
        Ok(response
            .into_inner()
            .to_dos
            .into_iter()
            .map(Todo::from_proto)
            .collect())
    }

    /// Ask the liveness probe for the serving status and any failure reason
    pub async fn health(&mut self) -> Result<HealthStatus, SdkError> {
        let request = self.request(HealthCheckRequest::default());
        let response = self.health.check(request).await?;
        let failure = response
            .metadata()
            .get(PROBE_FAILURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let status = ServingStatus::try_from(response.into_inner().status)
            .map_err(|e| SdkError::UnexpectedResponse(e.to_string()))?;
        Ok(HealthStatus {
            status: status.as_str_name().to_string(),
            failure,
        })
    }
}
