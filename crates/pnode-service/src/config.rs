//! Service configuration, constructed once at startup and passed by
//! reference into the client and aggregation service.

use pnode_types::NodeSource;
use std::time::Duration;

pub const DEFAULT_AGGREGATOR_URL: &str = "https://stats.pnodes.network/api/pnodes";
pub const DEFAULT_PODS_URL: &str = "https://gossip.pnodes.network";
pub const DEFAULT_CLUSTER_RPC_URL: &str = "https://rpc.pnodes.network";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// The closed set of upstream source families the pipeline understands.
/// Adding a family means adding a variant here, a fetch arm in the client
/// and a normalize arm for its raw record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFamily {
    /// Third-party aggregator: GET, `{ nodes: [...], summary: {...} }`.
    Aggregator,
    /// Peer-gossip pods endpoint: JSON-RPC POST, `result.pods` array.
    GossipPods,
    /// Legacy cluster RPC: JSON-RPC POST, `result` array.
    ClusterRpc,
}

/// One candidate upstream source. Endpoints are attempted strictly in the
/// order they appear in [`ServiceConfig::endpoints`].
#[derive(Debug, Clone)]
pub struct SourceEndpoint {
    pub family: SourceFamily,
    pub url: String,
}

/// Process-wide, read-only configuration for the fetch pipeline.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Candidate sources in priority order; first valid non-empty payload wins.
    pub endpoints: Vec<SourceEndpoint>,
    /// Total per-attempt timeout; an attempt is aborted once it expires.
    pub request_timeout: Duration,
    /// Bound on connection establishment within an attempt.
    pub connect_timeout: Duration,
    /// Provenance tag applied when the fallback set is served. Must be
    /// [`NodeSource::Mock`] or [`NodeSource::Devnet`].
    pub fallback_provenance: NodeSource,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                SourceEndpoint {
                    family: SourceFamily::Aggregator,
                    url: DEFAULT_AGGREGATOR_URL.to_string(),
                },
                SourceEndpoint {
                    family: SourceFamily::GossipPods,
                    url: DEFAULT_PODS_URL.to_string(),
                },
                SourceEndpoint {
                    family: SourceFamily::ClusterRpc,
                    url: DEFAULT_CLUSTER_RPC_URL.to_string(),
                },
            ],
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            fallback_provenance: NodeSource::Devnet,
        }
    }
}

impl ServiceConfig {
    /// Configuration with a single endpoint, mainly useful in tests and
    /// single-source deployments.
    pub fn single_endpoint(family: SourceFamily, url: impl Into<String>) -> Self {
        Self {
            endpoints: vec![SourceEndpoint {
                family,
                url: url.into(),
            }],
            ..Self::default()
        }
    }
}
