//! Root-level liveness endpoint for load balancers and the front-end.
//!
//! An unconfigured generation capability is reported but does not mark the
//! service degraded; persona and campaign management keep working without it.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` or `degraded`; only the store decides.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub ai_available: bool,
    pub ai_provider: String,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = state.campaign_store.ping().await.is_ok();
    let ai = state.services.generation.status();

    Json(HealthResponse {
        status: match db_healthy {
            true => "ok",
            false => "degraded",
        },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        ai_available: ai.available,
        ai_provider: ai.provider,
    })
}

/// `GET /health`, mounted outside `/api/v1` and without auth.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
