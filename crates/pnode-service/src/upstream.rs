//! Upstream client: bounded-timeout calls against the configured node-status
//! providers.
//!
//! The client validates shape only (is there a list of records) and leaves
//! all business classification to the normalizer. Every failure mode of an
//! attempt, transport error, non-2xx status, parse failure, missing top-level
//! field or timeout expiry, makes that endpoint fall through to the next
//! candidate; when every candidate is exhausted the fetch resolves to `None`.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::{ServiceConfig, SourceEndpoint, SourceFamily};
use crate::error::UpstreamError;

/// Raw record from the legacy cluster RPC (`getClusterNodes`). Carries a
/// stable identity key and gossip/rpc `ip:port` addresses, no liveness
/// window.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterNodeRecord {
    pub pubkey: Option<String>,
    pub gossip: Option<String>,
    pub rpc: Option<String>,
    pub version: Option<String>,
    pub feature_set: Option<u64>,
    pub shred_version: Option<u64>,
}

/// Raw record from the peer-gossip pods endpoint. Same identity scheme as
/// the cluster RPC, plus an explicit last-seen age in seconds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodRecord {
    pub pubkey: Option<String>,
    pub gossip: Option<String>,
    pub rpc: Option<String>,
    pub version: Option<String>,
    pub last_seen_seconds_ago: Option<i64>,
}

/// Raw record from the third-party aggregator. Status, liveness and
/// geolocation arrive already resolved.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregatorNodeRecord {
    pub id: Option<String>,
    pub address: Option<String>,
    pub ip: Option<String>,
    pub port: Option<String>,
    pub pubkey: Option<String>,
    pub version: Option<String>,
    pub status: Option<String>,
    pub has_public_rpc: Option<bool>,
    pub is_online: Option<bool>,
    pub last_seen_timestamp: Option<i64>,
    pub last_seen_ago_seconds: Option<i64>,
    pub cpu_percent: Option<f64>,
    pub uptime_seconds: Option<u64>,
    #[serde(rename = "ramUsedGB")]
    pub ram_used_gb: Option<f64>,
    #[serde(rename = "ramTotalGB")]
    pub ram_total_gb: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// A structurally valid payload from one source, tagged with the family that
/// produced it so the normalizer can dispatch on the raw shape.
#[derive(Debug, Clone)]
pub enum RawBatch {
    Cluster(Vec<ClusterNodeRecord>),
    Pods(Vec<PodRecord>),
    Aggregator(Vec<AggregatorNodeRecord>),
}

impl RawBatch {
    pub fn len(&self) -> usize {
        match self {
            RawBatch::Cluster(records) => records.len(),
            RawBatch::Pods(records) => records.len(),
            RawBatch::Aggregator(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// HTTP client over the configured upstream sources.
pub struct UpstreamClient {
    http: reqwest::Client,
    endpoints: Vec<SourceEndpoint>,
}

impl UpstreamClient {
    pub fn new(config: &ServiceConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            endpoints: config.endpoints.clone(),
        }
    }

    /// Try each configured source strictly in priority order and return the
    /// first non-empty, structurally valid payload. Resolves to `None` when
    /// every candidate fails; callers decide the fallback policy.
    pub async fn fetch_raw(&self) -> Option<RawBatch> {
        for endpoint in &self.endpoints {
            match self.try_endpoint(endpoint).await {
                Ok(batch) => {
                    info!(
                        url = %endpoint.url,
                        family = ?endpoint.family,
                        records = batch.len(),
                        "fetched raw node batch"
                    );
                    return Some(batch);
                }
                Err(e) => {
                    warn!(
                        url = %endpoint.url,
                        family = ?endpoint.family,
                        error = %e,
                        "upstream attempt failed, falling through"
                    );
                }
            }
        }

        warn!("all upstream sources exhausted with no usable payload");
        None
    }

    async fn try_endpoint(&self, endpoint: &SourceEndpoint) -> Result<RawBatch, UpstreamError> {
        let batch = match endpoint.family {
            SourceFamily::Aggregator => self.fetch_aggregator(&endpoint.url).await?,
            SourceFamily::GossipPods => self.fetch_pods(&endpoint.url).await?,
            SourceFamily::ClusterRpc => self.fetch_cluster(&endpoint.url).await?,
        };

        if batch.is_empty() {
            return Err(UpstreamError::Empty);
        }
        Ok(batch)
    }

    async fn fetch_aggregator(&self, url: &str) -> Result<RawBatch, UpstreamError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let body = check_status(response).await?;
        let nodes = body
            .get("nodes")
            .and_then(Value::as_array)
            .ok_or_else(|| UpstreamError::Shape("missing top-level `nodes` array".to_string()))?;

        if let Some(summary) = body.get("summary") {
            debug!(summary = %summary, "aggregator summary");
        }

        Ok(RawBatch::Aggregator(decode_records(nodes)))
    }

    async fn fetch_pods(&self, url: &str) -> Result<RawBatch, UpstreamError> {
        let request = json!({ "jsonrpc": "2.0", "id": 1, "method": "getPods" });
        let response = self.http.post(url).json(&request).send().await?;

        let body = check_status(response).await?;
        let pods = body
            .get("result")
            .and_then(|result| result.get("pods"))
            .and_then(Value::as_array)
            .ok_or_else(|| UpstreamError::Shape("missing `result.pods` array".to_string()))?;

        Ok(RawBatch::Pods(decode_records(pods)))
    }

    async fn fetch_cluster(&self, url: &str) -> Result<RawBatch, UpstreamError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getClusterNodes",
            "params": [],
        });
        let response = self.http.post(url).json(&request).send().await?;

        let body = check_status(response).await?;
        let nodes = body
            .get("result")
            .and_then(Value::as_array)
            .ok_or_else(|| UpstreamError::Shape("missing top-level `result` array".to_string()))?;

        Ok(RawBatch::Cluster(decode_records(nodes)))
    }
}

async fn check_status(response: reqwest::Response) -> Result<Value, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status));
    }
    Ok(response.json::<Value>().await?)
}

/// Decode individual records, dropping any that fail to decode. A malformed
/// record never fails the batch; only the top-level shape does.
fn decode_records<T: for<'de> Deserialize<'de>>(values: &[Value]) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| match serde_json::from_value(value.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "dropping undecodable raw record");
                None
            }
        })
        .collect()
}
