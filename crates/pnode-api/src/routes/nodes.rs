//! Node endpoints: the full normalized list and lookup by id.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::state::AppState;

/// Short TTL with background revalidation; node data changes on the polling
/// cadence, not per request.
const CACHE_CONTROL_VALUE: &str = "public, s-maxage=5, stale-while-revalidate=59";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_nodes))
        .route("/:id", get(get_node))
}

/// `GET /api/nodes`: one fetch cycle. Always 200 with a non-empty set; a
/// failed upstream fetch is visible only through `meta.source`.
async fn list_nodes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = state.service.fetch_nodes().await;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL_VALUE),
    );

    (headers, Json(response))
}

/// `GET /api/nodes/:id`: a single node, or a 404 with a JSON error body.
async fn get_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.service.fetch_node(&id).await {
        Some(node) => (StatusCode::OK, Json(json!(node))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "node not found", "id": id })),
        ),
    }
}
