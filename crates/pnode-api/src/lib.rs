//! HTTP API for the pNode dashboard.
//!
//! Serves the normalized node list and single-node lookups to the
//! presentation layer. Both endpoints are idempotent and safe to poll on a
//! timer; the list endpoint never returns an empty or error state for node
//! data (the aggregation service substitutes fallback data instead).

pub mod health;
pub mod routes;
pub mod state;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    // The dashboard frontend is served from a different origin.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .nest("/api/nodes", routes::nodes::routes())
        .merge(health::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
