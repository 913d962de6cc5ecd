//! End-to-end tests against a real server bound to an ephemeral port

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tonic::transport::Channel;
use tonic::Code;
use async_trait::async_trait;
use todo_domain::{Document, DocumentId, DocumentStore, DocumentStream, DocumentUpdate, Filter};
use todo_grpc::proto::health::health_check_response::ServingStatus;
use todo_grpc::proto::health::health_client::HealthClient;
use todo_grpc::proto::health::HealthCheckRequest;
use todo_grpc::proto::to_do_service_client::ToDoServiceClient;
use todo_grpc::proto::*;
use todo_grpc::{
    start_server, LivenessProber, RecordService, ServerConfig, ServerError, ServingServer,
    ShutdownSignal,
};
use todo_store::{MemoryStore, SqliteStore};

async fn serve<S: DocumentStore + 'static>(store: Arc<S>) -> ServingServer {
    let service = RecordService::new(store);
    let prober = service.liveness_prober(Duration::from_secs(1));
    start_server(
        &ServerConfig::new("127.0.0.1", 0),
        service,
        prober,
        ShutdownSignal::new(),
    )
    .await
    .unwrap()
}

/// Memory store whose reads take a while
struct SlowReadStore {
    inner: MemoryStore,
    delay: Duration,
}

#[async_trait]
impl DocumentStore for SlowReadStore {
    type Error = <MemoryStore as DocumentStore>::Error;

    async fn insert_one(&self, document: Document) -> Result<Option<DocumentId>, Self::Error> {
        self.inner.insert_one(document).await
    }

    async fn find_one(&self, id: DocumentId) -> Result<Option<Document>, Self::Error> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_one(id).await
    }

    async fn update_one(&self, id: DocumentId, update: &DocumentUpdate) -> Result<u64, Self::Error> {
        self.inner.update_one(id, update).await
    }

    async fn delete_one(&self, id: DocumentId) -> Result<u64, Self::Error> {
        self.inner.delete_one(id).await
    }

    async fn find(&self, filter: Filter) -> Result<DocumentStream<Self::Error>, Self::Error> {
        self.inner.find(filter).await
    }

    async fn ping(&self) -> Result<(), Self::Error> {
        self.inner.ping().await
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.inner.close().await
    }
}

async fn channel(server: &ServingServer) -> Channel {
    Channel::from_shared(format!("http://{}", server.local_addr()))
        .unwrap()
        .connect()
        .await
        .unwrap()
}

async fn run_scenario(server: &ServingServer) {
    let mut client = ToDoServiceClient::new(channel(server).await);

    let created = ToDo {
        id: String::new(),
        title: "X".to_string(),
        description: "ship it".to_string(),
        tags: vec!["go".to_string(), "k8s".to_string()],
        state: to_do::State::InProgress as i32,
        reminder: Some(prost_types::Timestamp {
            seconds: 1000,
            nanos: 0,
        }),
    };
    let id = client
        .create(CreateRequest {
            to_do: Some(created.clone()),
        })
        .await
        .unwrap()
        .into_inner()
        .id;
    assert!(!id.is_empty());

    let read = client
        .read(ReadRequest { id: id.clone() })
        .await
        .unwrap()
        .into_inner()
        .to_do
        .unwrap();
    let mut expected = created.clone();
    expected.id = id.clone();
    assert_eq!(read, expected);

    let updated = client
        .update(UpdateRequest {
            to_do: Some(ToDo {
                id: id.clone(),
                title: String::new(),
                description: String::new(),
                tags: vec!["go".to_string()],
                state: to_do::State::Done as i32,
                reminder: None,
            }),
        })
        .await
        .unwrap()
        .into_inner()
        .updated;
    assert_eq!(updated, 1);

    let read = client
        .read(ReadRequest { id: id.clone() })
        .await
        .unwrap()
        .into_inner()
        .to_do
        .unwrap();
    assert_eq!(read.title, "X");
    assert_eq!(read.description, "ship it");
    assert_eq!(read.tags, vec!["go"]);
    assert_eq!(read.state, to_do::State::Done as i32);
    assert_eq!(read.reminder.unwrap().seconds, 1000);

    let deleted = client
        .delete(DeleteRequest { id: id.clone() })
        .await
        .unwrap()
        .into_inner()
        .deleted;
    assert_eq!(deleted, 1);

    let read = client
        .read(ReadRequest { id: id.clone() })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(read.to_do, None);

    let found = client
        .search(SearchRequest {
            states: vec![to_do::State::Done as i32],
            ..Default::default()
        })
        .await
        .unwrap()
        .into_inner()
        .to_dos;
    assert!(found.is_empty());

    let deleted_again = client
        .delete(DeleteRequest { id })
        .await
        .unwrap()
        .into_inner()
        .deleted;
    assert_eq!(deleted_again, 0);
}

#[tokio::test]
async fn test_scenario_over_memory_store() {
    let server = serve(Arc::new(MemoryStore::new())).await;
    assert_ne!(server.port(), 0);

    run_scenario(&server).await;
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_scenario_over_sqlite_store() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path().join("todo.db")).unwrap());
    let server = serve(Arc::clone(&store)).await;

    run_scenario(&server).await;
    server.stop().await.unwrap();
    store.close().await.unwrap();
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_client_errors_over_the_wire() {
    let server = serve(Arc::new(MemoryStore::new())).await;
    let mut client = ToDoServiceClient::new(channel(&server).await);

    let status = client
        .read(ReadRequest {
            id: "not-an-id".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = client
        .search(SearchRequest {
            pattern: "(".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = client
        .update(UpdateRequest { to_do: None })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_health_follows_store() {
    let store = Arc::new(MemoryStore::new());
    let server = serve(Arc::clone(&store)).await;
    let mut client = HealthClient::new(channel(&server).await);

    let response = client
        .check(HealthCheckRequest::default())
        .await
        .unwrap()
        .into_inner();
    assert_eq!(response.status, ServingStatus::Serving as i32);

    store.set_offline(true);
    let response = client.check(HealthCheckRequest::default()).await.unwrap();
    assert_eq!(response.get_ref().status, ServingStatus::NotServing as i32);
    assert!(response
        .metadata()
        .get(todo_grpc::health::PROBE_FAILURE_HEADER)
        .is_some());

    let status = client
        .watch(HealthCheckRequest::default())
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_unconfigured_prober_reports_unknown() {
    let service = RecordService::new(Arc::new(MemoryStore::new()));
    let server = start_server(
        &ServerConfig::new("127.0.0.1", 0),
        service,
        LivenessProber::unconfigured(),
        ShutdownSignal::new(),
    )
    .await
    .unwrap();
    let mut client = HealthClient::new(channel(&server).await);

    let response = client
        .check(HealthCheckRequest::default())
        .await
        .unwrap()
        .into_inner();
    assert_eq!(response.status, ServingStatus::Unknown as i32);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port();

    let service = RecordService::new(Arc::new(MemoryStore::new()));
    let result = start_server(
        &ServerConfig::new("127.0.0.1", port),
        service,
        LivenessProber::unconfigured(),
        ShutdownSignal::new(),
    )
    .await;

    assert!(matches!(result, Err(ServerError::Bind { .. })));
}

#[tokio::test]
async fn test_cancel_drains_and_releases_listener() {
    let shutdown = ShutdownSignal::new();
    let service = RecordService::new(Arc::new(MemoryStore::new()));
    let server = start_server(
        &ServerConfig::new("127.0.0.1", 0),
        service,
        LivenessProber::unconfigured(),
        shutdown.clone(),
    )
    .await
    .unwrap();
    let addr = server.local_addr();

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), server.stopped())
        .await
        .expect("server should drain")
        .unwrap();

    // the port is free again once the listener is released
    let rebound = tokio::net::TcpListener::bind(addr).await;
    assert!(rebound.is_ok());
}

#[tokio::test]
async fn test_cancel_lets_in_flight_call_finish() {
    let shutdown = ShutdownSignal::new();
    let store = Arc::new(SlowReadStore {
        inner: MemoryStore::new(),
        delay: Duration::from_millis(300),
    });
    let service = RecordService::new(store);
    let server = start_server(
        &ServerConfig::new("127.0.0.1", 0),
        service,
        LivenessProber::unconfigured(),
        shutdown.clone(),
    )
    .await
    .unwrap();

    let mut client = ToDoServiceClient::new(channel(&server).await);
    let id = client
        .create(CreateRequest {
            to_do: Some(ToDo {
                title: "slow".to_string(),
                ..Default::default()
            }),
        })
        .await
        .unwrap()
        .into_inner()
        .id;

    let read = tokio::spawn(async move { client.read(ReadRequest { id }).await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    shutdown.cancel();
    let stopped = tokio::spawn(server.stopped());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!stopped.is_finished(), "server stopped with a call still in flight");

    let response = tokio::time::timeout(Duration::from_secs(5), read)
        .await
        .expect("in-flight read should finish")
        .unwrap()
        .unwrap()
        .into_inner();
    assert_eq!(response.to_do.unwrap().title, "slow");

    tokio::time::timeout(Duration::from_secs(5), stopped)
        .await
        .expect("server should drain")
        .unwrap()
        .unwrap();
}
