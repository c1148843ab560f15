use std::future::Future;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::trace::TraceLayer;

use yata_core::health::healthz;
use yata_core::middleware::{propagate_request_id_layer, request_id_layer};

/// Backends the service needs before it can take traffic.
pub trait Readiness: Clone + Send + Sync + 'static {
    fn check(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

async fn readyz<R: Readiness>(State(probe): State<R>) -> StatusCode {
    match probe.check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = ?e, "not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// HTTP surface for orchestrator probes. The auth API itself is served over gRPC.
pub fn build_router<R: Readiness>(probe: R) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<R>))
        .with_state(probe)
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
}
