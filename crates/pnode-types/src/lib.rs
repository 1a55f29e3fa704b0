//! Canonical data model for the pNode dashboard.
//!
//! Every node record served to the presentation layer, whether derived from
//! an upstream source or generated as fallback data, conforms to [`Node`].
//! The wire format uses camelCase field names to stay compatible with the
//! deployed dashboard frontend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Health status of a pNode, always derived, never taken verbatim from an
/// upstream vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Active,
    Degraded,
    Offline,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Active => write!(f, "active"),
            NodeStatus::Degraded => write!(f, "degraded"),
            NodeStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Release label derived from a free-text version string by substring match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Release {
    #[serde(rename = "Munich v0.8")]
    MunichV08,
    #[serde(rename = "Herrenberg v0.9")]
    HerrenbergV09,
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Release::MunichV08 => write!(f, "Munich v0.8"),
            Release::HerrenbergV09 => write!(f, "Herrenberg v0.9"),
        }
    }
}

/// Provenance of a result set: which generator produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSource {
    Live,
    Mock,
    Devnet,
}

impl fmt::Display for NodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeSource::Live => write!(f, "live"),
            NodeSource::Mock => write!(f, "mock"),
            NodeSource::Devnet => write!(f, "devnet"),
        }
    }
}

/// A normalized pNode record, constructed fresh on every fetch cycle.
///
/// Invariants upheld by the service pipeline:
/// - `id` is non-empty and unique within one result set
/// - `ip` is a syntactically valid dotted-quad IPv4 address
/// - `performance_score` lies in [0.0, 1.0]
/// - `stoinc` is zero whenever `status` is offline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub ip: String,
    pub region: String,
    pub status: NodeStatus,
    pub release: Release,
    pub performance_score: f64,
    pub stoinc: u64,
    pub has_titan: bool,
    /// Unix epoch milliseconds of the last observation.
    pub last_seen: i64,
    /// Distinguishes synthetic from upstream-derived records. Informational;
    /// the authoritative provenance is the envelope's `source` field.
    pub is_mock: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub requests: Option<u64>,
    pub requests_per_second: Option<u64>,
    pub cpu: Option<f64>,
    pub ram_used: Option<f64>,
    pub ram_total: Option<f64>,
}

/// Metadata attached to every node list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub source: NodeSource,
    /// Unix epoch milliseconds at which the set was assembled.
    pub timestamp: i64,
    pub count: usize,
}

/// Response envelope for one fetch cycle. `meta.count` always equals
/// `nodes.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodesResponse {
    pub nodes: Vec<Node>,
    pub meta: ResponseMeta,
}

impl NodesResponse {
    pub fn new(nodes: Vec<Node>, source: NodeSource, timestamp: i64) -> Self {
        let count = nodes.len();
        Self {
            nodes,
            meta: ResponseMeta {
                source,
                timestamp,
                count,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_node() -> Node {
        Node {
            id: "pubkey-1".to_string(),
            ip: "10.0.0.5".to_string(),
            region: "us-east-1".to_string(),
            status: NodeStatus::Active,
            release: Release::HerrenbergV09,
            performance_score: 0.9,
            stoinc: 4200,
            has_titan: true,
            last_seen: 1_700_000_000_000,
            is_mock: false,
            latitude: None,
            longitude: None,
            city: None,
            country: None,
            requests: None,
            requests_per_second: None,
            cpu: Some(35.0),
            ram_used: Some(4.2),
            ram_total: Some(8.0),
        }
    }

    #[test]
    fn node_serializes_with_camel_case_wire_names() {
        let value = serde_json::to_value(sample_node()).unwrap();
        assert_eq!(value["performanceScore"], 0.9);
        assert_eq!(value["hasTitan"], true);
        assert_eq!(value["lastSeen"], 1_700_000_000_000i64);
        assert_eq!(value["isMock"], false);
        assert_eq!(value["ramUsed"], 4.2);
        // Absent enrichment fields are serialized as explicit nulls.
        assert!(value["latitude"].is_null());
        assert!(value["requestsPerSecond"].is_null());
    }

    #[test]
    fn status_and_release_use_fixed_literals() {
        assert_eq!(
            serde_json::to_value(NodeStatus::Degraded).unwrap(),
            "degraded"
        );
        assert_eq!(
            serde_json::to_value(Release::MunichV08).unwrap(),
            "Munich v0.8"
        );
        assert_eq!(
            serde_json::to_value(Release::HerrenbergV09).unwrap(),
            "Herrenberg v0.9"
        );
        assert_eq!(serde_json::to_value(NodeSource::Devnet).unwrap(), "devnet");
    }

    #[test]
    fn envelope_count_tracks_node_list() {
        let response = NodesResponse::new(vec![sample_node(); 3], NodeSource::Live, 123);
        assert_eq!(response.meta.count, 3);
        assert_eq!(response.meta.count, response.nodes.len());
        assert_eq!(response.meta.source, NodeSource::Live);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["meta"]["source"], "live");
        assert_eq!(value["meta"]["count"], 3);
    }

    #[test]
    fn node_round_trips_through_wire_format() {
        let node = sample_node();
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
