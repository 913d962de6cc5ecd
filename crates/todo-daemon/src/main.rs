//! todod
//!
//! Serves the todo gRPC API until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use todo_daemon::config::DaemonArgs;
use todo_daemon::logging::init_tracing;
use todo_domain::BuildInfo;
use todo_grpc::ShutdownSignal;

#[tokio::main]
async fn main() -> Result<()> {
    let config = DaemonArgs::parse()
        .resolve()
        .context("failed to load configuration")?;

    init_tracing(&config.log_level, config.log_format)
        .map_err(anyhow::Error::msg)
        .context("failed to initialise logging")?;

    let shutdown = ShutdownSignal::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "failed to listen for ctrl-c");
                    }
                    tracing::info!("shutdown requested");
                    shutdown.cancel();
                }
                _ = shutdown.cancelled() => {}
            }
        });
    }

    todo_daemon::run(config, &BuildInfo::current(), shutdown)
        .await
        .context("todod stopped with an error")?;

    Ok(())
}
