//! Router-level tests for the dashboard API surface.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use pnode_api::{app, state::AppState};
use pnode_service::config::{ServiceConfig, SourceEndpoint, SourceFamily};
use pnode_service::NodeService;

/// State whose upstream endpoints point at a closed port, so every cycle
/// takes the fallback path without touching the network for long.
fn offline_state() -> Arc<AppState> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ServiceConfig {
        endpoints: vec![SourceEndpoint {
            family: SourceFamily::Aggregator,
            url: format!("http://{addr}/"),
        }],
        request_timeout: Duration::from_secs(1),
        connect_timeout: Duration::from_secs(1),
        ..ServiceConfig::default()
    };
    Arc::new(AppState::new(NodeService::new(config)))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn list_nodes_always_succeeds_with_nonempty_set() {
    let response = app(offline_state())
        .oneshot(Request::get("/api/nodes").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok()),
        Some("public, s-maxage=5, stale-while-revalidate=59")
    );

    let body = body_json(response).await;
    let nodes = body["nodes"].as_array().unwrap();
    assert!(!nodes.is_empty());
    assert_eq!(body["meta"]["count"].as_u64().unwrap() as usize, nodes.len());
    assert_eq!(body["meta"]["source"], "devnet");

    // Schema spot-checks on the wire format.
    let first = &nodes[0];
    assert!(first["performanceScore"].as_f64().unwrap() >= 0.0);
    assert!(first["performanceScore"].as_f64().unwrap() <= 1.0);
    assert!(first["id"].as_str().is_some());
    assert!(first["lastSeen"].as_i64().is_some());
}

#[tokio::test]
async fn live_upstream_is_reflected_in_provenance() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/pnodes")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "summary": { "total": 1 },
                "nodes": [
                    { "pubkey": "live-1", "ip": "10.0.0.5", "status": "online_public", "version": "0.9.2" }
                ]
            }"#,
        )
        .create_async()
        .await;

    let config = ServiceConfig {
        endpoints: vec![SourceEndpoint {
            family: SourceFamily::Aggregator,
            url: format!("{}/api/pnodes", server.url()),
        }],
        request_timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_secs(1),
        ..ServiceConfig::default()
    };
    let state = Arc::new(AppState::new(NodeService::new(config)));

    let response = app(state)
        .oneshot(Request::get("/api/nodes").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["meta"]["source"], "live");
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["nodes"][0]["id"], "live-1");
}

#[tokio::test]
async fn unknown_node_id_returns_404_with_json_error() {
    let response = app(offline_state())
        .oneshot(
            Request::get("/api/nodes/no-such-node")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "node not found");
    assert_eq!(body["id"], "no-such-node");
}

#[tokio::test]
async fn known_fallback_id_resolves() {
    let synthetic_id = format!("PNODE000{}", "x".repeat(36));
    let response = app(offline_state())
        .oneshot(
            Request::get(format!("/api/nodes/{synthetic_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], synthetic_id);
    assert_eq!(body["isMock"], true);
}

#[tokio::test]
async fn health_reports_ok_and_configured_sources() {
    let response = app(offline_state())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["configured_sources"], 1);
}
