//! Integration tests for the daemon wiring

use std::time::Duration;

use tempfile::TempDir;
use todo_daemon::config::{DaemonConfig, LogFormat};
use todo_daemon::{Daemon, DaemonError};
use todo_grpc::proto::health::health_check_response::ServingStatus;
use todo_grpc::proto::health::health_client::HealthClient;
use todo_grpc::proto::health::HealthCheckRequest;
use todo_grpc::proto::to_do_service_client::ToDoServiceClient;
use todo_grpc::proto::{CreateRequest, ReadRequest, ToDo};
use todo_grpc::{ServerError, ShutdownSignal};

fn test_config(database: String) -> DaemonConfig {
    DaemonConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database,
        log_level: "debug".to_string(),
        log_format: LogFormat::Text,
        probe_timeout_ms: 500,
    }
}

fn endpoint(daemon: &Daemon) -> String {
    format!("http://{}", daemon.local_addr())
}

#[tokio::test]
async fn test_memory_daemon_serves_and_stops() {
    let shutdown = ShutdownSignal::new();
    let daemon = Daemon::start(&test_config(":memory:".to_string()), shutdown.clone())
        .await
        .unwrap();

    let mut health = HealthClient::connect(endpoint(&daemon)).await.unwrap();
    let status = health
        .check(HealthCheckRequest::default())
        .await
        .unwrap()
        .into_inner()
        .status;
    assert_eq!(status, ServingStatus::Serving as i32);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), daemon.wait())
        .await
        .expect("daemon should stop")
        .unwrap();
}

#[tokio::test]
async fn test_sqlite_daemon_persists_across_restarts() {
    let dir = TempDir::new().unwrap();
    let database = dir.path().join("todo.db").to_string_lossy().into_owned();

    let daemon = Daemon::start(&test_config(database.clone()), ShutdownSignal::new())
        .await
        .unwrap();
    let mut client = ToDoServiceClient::connect(endpoint(&daemon)).await.unwrap();
    let id = client
        .create(CreateRequest {
            to_do: Some(ToDo {
                title: "persist me".to_string(),
                ..Default::default()
            }),
        })
        .await
        .unwrap()
        .into_inner()
        .id;
    daemon.shutdown_signal().cancel();
    daemon.wait().await.unwrap();

    let daemon = Daemon::start(&test_config(database), ShutdownSignal::new())
        .await
        .unwrap();
    let mut client = ToDoServiceClient::connect(endpoint(&daemon)).await.unwrap();
    let found = client
        .read(ReadRequest { id })
        .await
        .unwrap()
        .into_inner()
        .to_do
        .unwrap();
    assert_eq!(found.title, "persist me");

    daemon.shutdown_signal().cancel();
    daemon.wait().await.unwrap();
}

#[tokio::test]
async fn test_port_in_use_is_fatal() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = test_config(":memory:".to_string());
    config.port = occupied.local_addr().unwrap().port();

    let result = Daemon::start(&config, ShutdownSignal::new()).await;
    assert!(matches!(
        result,
        Err(DaemonError::Server(ServerError::Bind { .. }))
    ));
}

#[tokio::test]
async fn test_unopenable_database_is_fatal() {
    let dir = TempDir::new().unwrap();
    let database = dir
        .path()
        .join("missing")
        .join("todo.db")
        .to_string_lossy()
        .into_owned();

    let result = Daemon::start(&test_config(database), ShutdownSignal::new()).await;
    assert!(matches!(result, Err(DaemonError::Store(_))));
}
