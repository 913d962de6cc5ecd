//! gRPC server configuration and lifecycle management
//!
//! Binds the listener up front so the caller learns the resolved port, then
//! serves in the background until the shutdown signal fires.

use std::io;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_stream::{Stream, StreamExt};
use tonic::transport::Server;
use todo_domain::DocumentStore;

use crate::error::ServerError;
use crate::health::LivenessProber;
use crate::proto::health::health_server::HealthServer;
use crate::proto::to_do_service_server::ToDoServiceServer;
use crate::service::RecordService;
use crate::shutdown::ShutdownSignal;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server listen host
    pub host: String,

    /// Server port; 0 asks the OS for an ephemeral port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the full server address
    pub fn full_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// A server accepting calls in the background
#[derive(Debug)]
pub struct ServingServer {
    local_addr: SocketAddr,
    shutdown: ShutdownSignal,
    accept: JoinHandle<Result<(), ServerError>>,
    watcher: JoinHandle<()>,
}

impl ServingServer {
    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Resolved listening port
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Signal governing this server
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Wait until the server has drained and released its listener
    ///
    /// # Errors
    /// Returns the accept loop's failure, if it had one.
    pub async fn stopped(self) -> Result<(), ServerError> {
        let result = self
            .accept
            .await
            .map_err(|e| ServerError::Task(e.to_string()))?;
        self.watcher
            .await
            .map_err(|e| ServerError::Task(e.to_string()))?;
        result
    }

    /// Fire the shutdown signal and wait for the drain to finish
    pub async fn stop(self) -> Result<(), ServerError> {
        self.shutdown.cancel();
        self.stopped().await
    }
}

/// Bind the listener and start serving in the background
///
/// Returns once the listener is bound; calls are accepted on a spawned task
/// until `shutdown` fires, at which point in-flight calls finish and the
/// listener is released. An accept loop failure fires `shutdown` itself.
///
/// # Errors
/// Returns [`ServerError::Bind`] if the listener cannot be bound.
pub async fn start_server<S>(
    config: &ServerConfig,
    service: RecordService<S>,
    prober: LivenessProber,
    shutdown: ShutdownSignal,
) -> Result<ServingServer, ServerError>
where
    S: DocumentStore + 'static,
{
    let addr = config.full_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;

    tracing::info!(%local_addr, port = local_addr.port(), "gRPC server listening");

    Ok(serve_incoming(
        local_addr,
        TcpListenerStream::new(listener),
        service,
        prober,
        shutdown,
    ))
}

/// Serve connections from `incoming` until `shutdown` fires or accepting fails
///
/// The first accept error is logged, fires `shutdown`, ends the stream so the
/// server drains, and is what [`ServingServer::stopped`] returns.
fn serve_incoming<S, I>(
    local_addr: SocketAddr,
    incoming: I,
    service: RecordService<S>,
    prober: LivenessProber,
    shutdown: ShutdownSignal,
) -> ServingServer
where
    S: DocumentStore + 'static,
    I: Stream<Item = io::Result<TcpStream>> + Send + 'static,
{
    let (drain_tx, drain_rx) = oneshot::channel::<()>();
    let (failure_tx, mut failure_rx) = oneshot::channel::<io::Error>();

    let incoming = {
        let shutdown = shutdown.clone();
        let mut failure_tx = Some(failure_tx);
        incoming.map_while(move |conn| match conn {
            Ok(stream) => Some(Ok::<_, io::Error>(stream)),
            Err(err) => {
                tracing::error!(error = %err, "failed to accept connection");
                if let Some(tx) = failure_tx.take() {
                    let _ = tx.send(err);
                }
                shutdown.cancel();
                None
            }
        })
    };

    let accept = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let result = Server::builder()
                .add_service(ToDoServiceServer::new(service))
                .add_service(HealthServer::new(prober))
                .serve_with_incoming_shutdown(incoming, async move {
                    let _ = drain_rx.await;
                })
                .await;

            match (result, failure_rx.try_recv()) {
                (_, Ok(err)) => Err(ServerError::Accept(err)),
                (Ok(()), Err(_)) => {
                    tracing::info!("gRPC server stopped");
                    Ok(())
                }
                (Err(err), Err(_)) => {
                    tracing::error!(error = %err, "gRPC server failed");
                    shutdown.cancel();
                    Err(ServerError::from(err))
                }
            }
        })
    };

    let watcher = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            tracing::info!("draining gRPC server");
            let _ = drain_tx.send(());
        })
    };

    ServingServer {
        local_addr,
        shutdown,
        accept,
        watcher,
    }
}
