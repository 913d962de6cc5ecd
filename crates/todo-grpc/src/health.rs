//! Liveness probe behind `grpc.health.v1.Health`
//!
//! Wraps a zero-argument check supplied at construction. Without a check the
//! probe answers UNKNOWN; a failing check answers NOT_SERVING and the failure
//! is returned to the caller in the `probe-failure` response metadata.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_stream::Stream;
use tonic::metadata::MetadataValue;
use tonic::{Request, Response, Status};

use crate::proto::health::health_check_response::ServingStatus;
use crate::proto::health::health_server::Health;
use crate::proto::health::{HealthCheckRequest, HealthCheckResponse};

/// Metadata key carrying the failure of a NOT_SERVING probe
pub const PROBE_FAILURE_HEADER: &str = "probe-failure";

/// Boxed future returned by a probe function
pub type ProbeFuture = Pin<Box<dyn Future<Output = Result<(), ProbeError>> + Send>>;

/// Shared zero-argument probe function
pub type ProbeFn = Arc<dyn Fn() -> ProbeFuture + Send + Sync>;

/// Why a probe reported NOT_SERVING
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ProbeError(pub String);

impl ProbeError {
    /// Build from anything printable
    pub fn new(msg: impl fmt::Display) -> Self {
        Self(msg.to_string())
    }
}

/// Result of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// No probe function was configured
    Unknown,
    /// The probe succeeded
    Serving,
    /// The probe failed
    NotServing(ProbeError),
}

impl ProbeOutcome {
    /// Wire status for this outcome
    pub fn status(&self) -> ServingStatus {
        match self {
            ProbeOutcome::Unknown => ServingStatus::Unknown,
            ProbeOutcome::Serving => ServingStatus::Serving,
            ProbeOutcome::NotServing(_) => ServingStatus::NotServing,
        }
    }
}

/// Health service answering from a user-supplied check
#[derive(Clone, Default)]
pub struct LivenessProber {
    probe: Option<ProbeFn>,
}

impl LivenessProber {
    /// Prober with no check; always reports UNKNOWN
    pub fn unconfigured() -> Self {
        Self { probe: None }
    }

    /// Prober running `check` on every request
    pub fn new<F, Fut>(check: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
    {
        Self {
            probe: Some(Arc::new(move || Box::pin(check()) as ProbeFuture)),
        }
    }

    /// Run the check once
    pub async fn probe(&self) -> ProbeOutcome {
        let Some(probe) = &self.probe else {
            tracing::error!("health check function is not configured");
            return ProbeOutcome::Unknown;
        };

        match probe().await {
            Ok(()) => {
                tracing::debug!("health check passed");
                ProbeOutcome::Serving
            }
            Err(err) => {
                tracing::error!(error = %err, "health check failed");
                ProbeOutcome::NotServing(err)
            }
        }
    }
}

impl fmt::Debug for LivenessProber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivenessProber")
            .field("configured", &self.probe.is_some())
            .finish()
    }
}

#[tonic::async_trait]
impl Health for LivenessProber {
    type WatchStream = Pin<Box<dyn Stream<Item = Result<HealthCheckResponse, Status>> + Send>>;

    async fn check(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        tracing::info!("received health check");
        let outcome = self.probe().await;

        let mut response = Response::new(HealthCheckResponse {
            status: outcome.status() as i32,
        });

        if let ProbeOutcome::NotServing(err) = &outcome {
            // metadata values are visible ASCII only
            match MetadataValue::try_from(err.0.escape_default().to_string()) {
                Ok(value) => {
                    response.metadata_mut().insert(PROBE_FAILURE_HEADER, value);
                }
                Err(e) => tracing::warn!(error = %e, "probe failure not attached to response"),
            }
        }

        Ok(response)
    }

    async fn watch(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        Err(Status::unimplemented("not implemented"))
    }
}
