//! Normalizer: converts raw, source-specific records into canonical
//! [`Node`] values, or rejects them.
//!
//! Rejection is silent: a record lacking a usable identity or a
//! syntactically valid IPv4 address is omitted from the output and the rest
//! of the batch continues. Output order preserves input order; duplicate ids
//! within one batch keep the first occurrence.
//!
//! Status derivation differs per source family and the rules are never mixed
//! for one record:
//! - cluster RPC records carry no liveness signal, so status comes from
//!   capability (contact addresses present, version generation);
//! - pod records carry a last-seen age, so status comes from recency of
//!   contact (2 minute / 10 minute windows); a pod missing the age field is
//!   classified by the capability rule instead;
//! - aggregator records carry an explicit status enumeration, mapped onto
//!   the canonical three-way split by a fixed table.

use rand::Rng;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::str::FromStr;

use pnode_types::{Node, NodeStatus, Release};

use crate::upstream::{AggregatorNodeRecord, ClusterNodeRecord, PodRecord, RawBatch};

/// Contact within this window counts as active.
const ACTIVE_WINDOW_SECS: i64 = 120;
/// Contact within this window (but past the active one) counts as degraded.
const DEGRADED_WINDOW_SECS: i64 = 600;

/// Substring marking the older release generation in free-text versions.
const LEGACY_VERSION_MARKER: &str = "0.8";

/// CPU utilization below this threshold nudges the performance score upward.
const CPU_HEADROOM_THRESHOLD: f64 = 50.0;

const STOINC_MIN: u64 = 1_000;
const STOINC_MAX: u64 = 10_000;

/// Normalize one raw batch into canonical nodes, dispatching on the source
/// family that produced it.
pub fn normalize_batch(batch: &RawBatch, now_ms: i64, rng: &mut impl Rng) -> Vec<Node> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(batch.len());

    match batch {
        RawBatch::Cluster(records) => {
            for record in records {
                if let Some(node) = normalize_cluster_record(record, now_ms, rng) {
                    push_unique(&mut nodes, &mut seen, node);
                }
            }
        }
        RawBatch::Pods(records) => {
            for record in records {
                if let Some(node) = normalize_pod_record(record, now_ms, rng) {
                    push_unique(&mut nodes, &mut seen, node);
                }
            }
        }
        RawBatch::Aggregator(records) => {
            for record in records {
                if let Some(node) = normalize_aggregator_record(record, now_ms, rng) {
                    push_unique(&mut nodes, &mut seen, node);
                }
            }
        }
    }

    nodes
}

fn push_unique(nodes: &mut Vec<Node>, seen: &mut HashSet<String>, node: Node) {
    if seen.insert(node.id.clone()) {
        nodes.push(node);
    }
}

fn normalize_cluster_record(
    record: &ClusterNodeRecord,
    now_ms: i64,
    rng: &mut impl Rng,
) -> Option<Node> {
    let id = non_empty(record.pubkey.as_deref())?;
    let ip = extract_ipv4(record.gossip.as_deref()).or_else(|| extract_ipv4(record.rpc.as_deref()))?;

    let status = classify_by_capability(
        record.gossip.as_deref(),
        record.rpc.as_deref(),
        record.version.as_deref(),
    );

    Some(assemble_node(
        id.to_string(),
        ip,
        None,
        status,
        record.version.as_deref(),
        None,
        non_empty(record.rpc.as_deref()).is_some(),
        now_ms,
        rng,
    ))
}

fn normalize_pod_record(record: &PodRecord, now_ms: i64, rng: &mut impl Rng) -> Option<Node> {
    let id = non_empty(record.pubkey.as_deref())?;
    let ip = extract_ipv4(record.gossip.as_deref()).or_else(|| extract_ipv4(record.rpc.as_deref()))?;

    let (status, last_seen) = match record.last_seen_seconds_ago {
        Some(secs) => (
            classify_by_recency(secs),
            now_ms - secs.saturating_mul(1_000),
        ),
        None => (
            classify_by_capability(
                record.gossip.as_deref(),
                record.rpc.as_deref(),
                record.version.as_deref(),
            ),
            now_ms,
        ),
    };

    Some(assemble_node(
        id.to_string(),
        ip,
        None,
        status,
        record.version.as_deref(),
        None,
        non_empty(record.rpc.as_deref()).is_some(),
        last_seen,
        rng,
    ))
}

fn normalize_aggregator_record(
    record: &AggregatorNodeRecord,
    now_ms: i64,
    rng: &mut impl Rng,
) -> Option<Node> {
    let ip = record
        .ip
        .as_deref()
        .filter(|candidate| is_valid_ipv4(candidate))?
        .to_string();

    let id = non_empty(record.pubkey.as_deref())
        .or_else(|| non_empty(record.id.as_deref()))
        .or_else(|| non_empty(record.address.as_deref()))?
        .to_string();

    let status = map_aggregator_status(record.status.as_deref());
    let last_seen = record
        .last_seen_timestamp
        .map(|secs| secs.saturating_mul(1_000))
        .unwrap_or(now_ms);

    let mut node = assemble_node(
        id,
        ip,
        non_empty(record.country.as_deref()).map(str::to_string),
        status,
        record.version.as_deref(),
        record.cpu_percent,
        record.has_public_rpc.unwrap_or(false),
        last_seen,
        rng,
    );

    // Geolocation and resource fields arrive already resolved; pass them
    // through verbatim.
    node.latitude = record.latitude;
    node.longitude = record.longitude;
    node.city = record.city.clone();
    node.country = record.country.clone();
    node.cpu = record.cpu_percent;
    node.ram_used = record.ram_used_gb;
    node.ram_total = record.ram_total_gb;

    Some(node)
}

#[allow(clippy::too_many_arguments)]
fn assemble_node(
    id: String,
    ip: String,
    declared_region: Option<String>,
    status: NodeStatus,
    version: Option<&str>,
    cpu_percent: Option<f64>,
    has_public_rpc: bool,
    last_seen: i64,
    rng: &mut impl Rng,
) -> Node {
    let region = declared_region.unwrap_or_else(|| infer_region(&ip).to_string());

    Node {
        performance_score: draw_performance_score(status, cpu_percent, rng),
        stoinc: draw_stoinc(status, rng),
        has_titan: status != NodeStatus::Offline && has_public_rpc,
        release: release_from_version(version),
        id,
        ip,
        region,
        status,
        last_seen,
        is_mock: false,
        latitude: None,
        longitude: None,
        city: None,
        country: None,
        requests: None,
        requests_per_second: None,
        cpu: None,
        ram_used: None,
        ram_total: None,
    }
}

/// Recency-of-contact heuristic, used when a source reports a last-seen age.
fn classify_by_recency(seconds_ago: i64) -> NodeStatus {
    if seconds_ago <= ACTIVE_WINDOW_SECS {
        NodeStatus::Active
    } else if seconds_ago <= DEGRADED_WINDOW_SECS {
        NodeStatus::Degraded
    } else {
        NodeStatus::Offline
    }
}

/// Capability heuristic, used when a source carries no liveness signal at
/// all: no contact addresses means offline, the older release generation
/// means degraded, anything else is considered active.
fn classify_by_capability(
    gossip: Option<&str>,
    rpc: Option<&str>,
    version: Option<&str>,
) -> NodeStatus {
    if non_empty(gossip).is_none() && non_empty(rpc).is_none() {
        return NodeStatus::Offline;
    }
    match version {
        Some(v) if v.contains(LEGACY_VERSION_MARKER) => NodeStatus::Degraded,
        _ => NodeStatus::Active,
    }
}

/// Fixed mapping from the aggregator's status vocabulary onto the canonical
/// three-way split.
fn map_aggregator_status(status: Option<&str>) -> NodeStatus {
    match status {
        Some("online_public") | Some("online_private") => NodeStatus::Active,
        Some("unknown") => NodeStatus::Degraded,
        _ => NodeStatus::Offline,
    }
}

/// Classify a free-text version string into one of the two release labels.
/// Absence of the legacy marker defaults to the newer release.
pub fn release_from_version(version: Option<&str>) -> Release {
    match version {
        Some(v) if v.contains(LEGACY_VERSION_MARKER) => Release::MunichV08,
        _ => Release::HerrenbergV09,
    }
}

/// Coarse region bucket from the IP's first octet. Not real GeoIP and will
/// misclassify in practice; the partition is preserved for compatibility
/// with the deployed dashboard.
pub fn infer_region(ip: &str) -> &'static str {
    let first_octet: u16 = ip
        .split('.')
        .next()
        .and_then(|octet| octet.parse().ok())
        .unwrap_or(0);

    match first_octet {
        1..=63 => "us-east-1",
        64..=127 => "us-west-2",
        128..=159 => "eu-central-1",
        160..=191 => "eu-west-1",
        192..=223 => "ap-southeast-1",
        _ => "ap-northeast-1",
    }
}

/// Pull a syntactically valid IPv4 address out of a gossip-style `ip:port`
/// string. Records whose address fails this are dropped, never coerced.
fn extract_ipv4(address: Option<&str>) -> Option<String> {
    let address = non_empty(address)?;
    let host = address.split(':').next()?.trim();
    is_valid_ipv4(host).then(|| host.to_string())
}

fn is_valid_ipv4(candidate: &str) -> bool {
    Ipv4Addr::from_str(candidate).is_ok()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Status-conditioned synthetic performance score in [0, 1]. A reported CPU
/// utilization under the headroom threshold nudges an active node's score
/// upward, clamped at 1.0.
fn draw_performance_score(status: NodeStatus, cpu_percent: Option<f64>, rng: &mut impl Rng) -> f64 {
    match status {
        NodeStatus::Active => {
            let mut score = 0.85 + rng.gen::<f64>() * 0.15;
            if matches!(cpu_percent, Some(cpu) if cpu < CPU_HEADROOM_THRESHOLD) {
                score = (score + 0.1).min(1.0);
            }
            score
        }
        NodeStatus::Degraded => 0.5 + rng.gen::<f64>() * 0.3,
        NodeStatus::Offline => 0.2,
    }
}

/// Bounded synthetic STOINC value; always zero for offline nodes.
fn draw_stoinc(status: NodeStatus, rng: &mut impl Rng) -> u64 {
    if status == NodeStatus::Offline {
        0
    } else {
        rng.gen_range(STOINC_MIN..STOINC_MAX)
    }
}
