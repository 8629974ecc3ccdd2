//! Health endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::CompositeHealth;
use serde::Serialize;

use crate::routes::composite::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health — plain liveness. This is the endpoint downstream
/// health probes target, so it must never recurse into aggregation.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /health/composite — aggregated downstream health, 503 when any
/// entry is down.
pub async fn composite(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<CompositeHealth>) {
    let health = state.health_aggregator.composite_health().await;
    let status = if health.up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}
