//! Aggregation service: orchestrates one fetch cycle end to end and decides
//! provenance.
//!
//! Per cycle: upstream attempt, then normalization; a non-empty canonical
//! set is served as `live`, anything else (empty set, total upstream
//! failure) deterministically substitutes the fallback set under the
//! configured fallback provenance tag. The decision is total: every call
//! returns a non-empty node list and a valid source tag, and no error ever
//! propagates to the caller. Retries belong to the caller's polling cadence,
//! not to this component.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use pnode_types::{Node, NodesResponse};

use crate::config::ServiceConfig;
use crate::fallback::FallbackGenerator;
use crate::normalize::normalize_batch;
use crate::upstream::UpstreamClient;

pub struct NodeService {
    config: ServiceConfig,
    client: UpstreamClient,
    fallback: FallbackGenerator,
}

impl NodeService {
    pub fn new(config: ServiceConfig) -> Self {
        let client = UpstreamClient::new(&config);
        Self {
            config,
            client,
            fallback: FallbackGenerator::new(),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run one fetch cycle. Always returns a non-empty, schema-valid set;
    /// the envelope's `source` field is the only visible difference between
    /// live and fallback data.
    pub async fn fetch_nodes(&self) -> NodesResponse {
        let now_ms = Utc::now().timestamp_millis();

        if let Some(nodes) = self.fetch_live(now_ms).await {
            info!(count = nodes.len(), "serving live node set");
            return NodesResponse::new(nodes, pnode_types::NodeSource::Live, now_ms);
        }

        warn!(
            provenance = %self.config.fallback_provenance,
            "live fetch failed or empty, serving fallback node set"
        );
        let mut rng = StdRng::from_entropy();
        let nodes = self.fallback.generate(now_ms, &mut rng);
        NodesResponse::new(nodes, self.config.fallback_provenance, now_ms)
    }

    /// Look up a single node by id: the live set first, then the fallback
    /// set. `None` means the id is unknown to both.
    pub async fn fetch_node(&self, id: &str) -> Option<Node> {
        let now_ms = Utc::now().timestamp_millis();

        if let Some(nodes) = self.fetch_live(now_ms).await {
            if let Some(found) = nodes.into_iter().find(|node| node.id == id) {
                return Some(found);
            }
        }

        let mut rng = StdRng::from_entropy();
        self.fallback
            .generate(now_ms, &mut rng)
            .into_iter()
            .find(|node| node.id == id)
    }

    async fn fetch_live(&self, now_ms: i64) -> Option<Vec<Node>> {
        let batch = self.client.fetch_raw().await?;
        let mut rng = StdRng::from_entropy();
        let nodes = normalize_batch(&batch, now_ms, &mut rng);
        if nodes.is_empty() {
            warn!(
                raw_records = batch.len(),
                "normalization rejected every raw record"
            );
            return None;
        }
        Some(nodes)
    }
}
