use axum::http::StatusCode;

/// Liveness probe. Readiness depends on each service's backends and lives
/// with the service.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
