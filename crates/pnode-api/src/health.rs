use axum::{extract::State, response::Json, routing::get, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Number of upstream sources the fetch pipeline is configured with.
    pub configured_sources: usize,
}

async fn check_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        configured_sources: state.service.config().endpoints.len(),
    })
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(check_health))
}
