use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pnode_api::{app, state::AppState};
use pnode_service::config::{ServiceConfig, SourceEndpoint, SourceFamily};
use pnode_service::NodeService;
use pnode_types::NodeSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "pnode_api=debug,pnode_service=debug,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();

    // Malformed configuration is fatal here, at startup, never at request
    // time.
    let config = config_from_env()?;
    let state = Arc::new(AppState::new(NodeService::new(config)));

    let addr = std::env::var("PNODE_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "pNode dashboard API listening");

    axum::serve(listener, app(state)).await?;
    Ok(())
}

/// Assemble the service configuration from environment overrides on top of
/// the built-in defaults.
fn config_from_env() -> anyhow::Result<ServiceConfig> {
    let mut config = ServiceConfig::default();

    let mut endpoints = Vec::new();
    if let Ok(url) = std::env::var("PNODE_AGGREGATOR_URL") {
        endpoints.push(SourceEndpoint {
            family: SourceFamily::Aggregator,
            url,
        });
    }
    if let Ok(url) = std::env::var("PNODE_PODS_URL") {
        endpoints.push(SourceEndpoint {
            family: SourceFamily::GossipPods,
            url,
        });
    }
    if let Ok(url) = std::env::var("PNODE_RPC_URL") {
        endpoints.push(SourceEndpoint {
            family: SourceFamily::ClusterRpc,
            url,
        });
    }
    if !endpoints.is_empty() {
        config.endpoints = endpoints;
    }

    if let Ok(raw) = std::env::var("PNODE_TIMEOUT_SECS") {
        let secs: u64 = raw
            .parse()
            .with_context(|| format!("invalid PNODE_TIMEOUT_SECS: {raw}"))?;
        config.request_timeout = Duration::from_secs(secs);
    }

    if let Ok(raw) = std::env::var("PNODE_FALLBACK_SOURCE") {
        config.fallback_provenance = match raw.as_str() {
            "mock" => NodeSource::Mock,
            "devnet" => NodeSource::Devnet,
            other => anyhow::bail!("invalid PNODE_FALLBACK_SOURCE: {other} (expected mock|devnet)"),
        };
    }

    Ok(config)
}
