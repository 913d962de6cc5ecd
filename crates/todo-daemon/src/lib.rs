//! Todo daemon
//!
//! Wires a document store into the gRPC server and runs it until shutdown.

#![warn(missing_docs)]

pub mod config;
pub mod logging;

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use config::DaemonConfig;
use todo_domain::{BuildInfo, DocumentStore};
use todo_grpc::{start_server, RecordService, ServerError, ServingServer, ShutdownSignal};
use todo_store::{MemoryStore, SqliteStore, StoreError};
use tracing::{info, warn};

/// Daemon error
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The store could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The server failed to start or stopped with an error
    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

type CloseFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;

/// A running daemon
pub struct Daemon {
    server: ServingServer,
    close_store: CloseFuture,
}

impl Daemon {
    /// Open the configured store and start serving
    ///
    /// # Errors
    /// Fails if the store cannot be opened or the listener cannot be bound.
    pub async fn start(config: &DaemonConfig, shutdown: ShutdownSignal) -> Result<Self, DaemonError> {
        if config.uses_memory_store() {
            info!("using in-memory store");
            Self::serve(Arc::new(MemoryStore::new()), config, shutdown).await
        } else {
            info!(database = %config.database, "opening SQLite store");
            let store = SqliteStore::open(&config.database)?;
            Self::serve(Arc::new(store), config, shutdown).await
        }
    }

    async fn serve<S>(store: Arc<S>, config: &DaemonConfig, shutdown: ShutdownSignal) -> Result<Self, DaemonError>
    where
        S: DocumentStore + 'static,
    {
        let service = RecordService::new(store);
        let prober = service.liveness_prober(config.probe_timeout());
        let server = start_server(&config.server_config(), service.clone(), prober, shutdown).await?;

        let close_store: CloseFuture = Box::pin(async move {
            service.close().await.map_err(|e| e.to_string())
        });

        Ok(Self {
            server,
            close_store,
        })
    }

    /// Address the server is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    /// Signal that stops this daemon
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        self.server.shutdown_signal()
    }

    /// Wait for the server to drain, then release the store
    ///
    /// # Errors
    /// Returns the server's failure if its accept loop failed.
    pub async fn wait(self) -> Result<(), DaemonError> {
        let result = self.server.stopped().await;

        match self.close_store.await {
            Ok(()) => info!("store closed"),
            Err(e) => warn!(error = %e, "failed to close store"),
        }

        result.map_err(DaemonError::from)
    }
}

/// Run until `shutdown` fires
pub async fn run(config: DaemonConfig, build: &BuildInfo, shutdown: ShutdownSignal) -> Result<(), DaemonError> {
    info!(
        version = build.version,
        git_commit = build.git_commit,
        git_describe = build.git_describe,
        git_dirty = build.git_dirty,
        build_time = build.build_time,
        "starting todod"
    );

    let daemon = Daemon::start(&config, shutdown).await?;
    info!(port = daemon.local_addr().port(), "todod serving");

    daemon.wait().await
}
