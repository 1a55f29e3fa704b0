//! Fallback generator: a fixed-cardinality, schema-conformant node set used
//! whenever the live pipeline yields nothing.
//!
//! The structure is deterministic (same IPs, regions, base statuses and
//! release labels on every call); only bounded jitter on derived numeric
//! fields varies between calls, and all of it flows through the injected
//! random source so tests can seed it.

use rand::Rng;

use pnode_types::{Node, NodeStatus, Release};

/// Baseline shape of one synthetic node. The jittered performance score
/// stays within 0.05 of `performance_base`, clamped to [0.05, 1.0].
struct BaseNode {
    ip: &'static str,
    region: &'static str,
    status: NodeStatus,
    release: Release,
    performance_base: f64,
}

const BASE_NODES: [BaseNode; 12] = [
    // Active nodes
    BaseNode { ip: "185.244.212.45", region: "us-east-1", status: NodeStatus::Active, release: Release::HerrenbergV09, performance_base: 0.92 },
    BaseNode { ip: "194.163.156.78", region: "eu-central-1", status: NodeStatus::Active, release: Release::HerrenbergV09, performance_base: 0.88 },
    BaseNode { ip: "104.18.32.167", region: "us-west-2", status: NodeStatus::Active, release: Release::HerrenbergV09, performance_base: 0.95 },
    BaseNode { ip: "172.67.194.23", region: "eu-west-1", status: NodeStatus::Active, release: Release::HerrenbergV09, performance_base: 0.91 },
    BaseNode { ip: "34.102.136.180", region: "ap-southeast-1", status: NodeStatus::Active, release: Release::HerrenbergV09, performance_base: 0.87 },
    BaseNode { ip: "35.198.164.75", region: "ap-northeast-1", status: NodeStatus::Active, release: Release::HerrenbergV09, performance_base: 0.93 },
    BaseNode { ip: "13.250.102.34", region: "us-east-1", status: NodeStatus::Active, release: Release::HerrenbergV09, performance_base: 0.89 },
    // Degraded nodes
    BaseNode { ip: "52.221.184.56", region: "ap-southeast-1", status: NodeStatus::Degraded, release: Release::MunichV08, performance_base: 0.65 },
    BaseNode { ip: "18.182.56.143", region: "eu-central-1", status: NodeStatus::Degraded, release: Release::MunichV08, performance_base: 0.58 },
    BaseNode { ip: "54.178.234.91", region: "us-west-2", status: NodeStatus::Degraded, release: Release::HerrenbergV09, performance_base: 0.72 },
    // Offline nodes
    BaseNode { ip: "147.12.12.12", region: "eu-west-1", status: NodeStatus::Offline, release: Release::MunichV08, performance_base: 0.15 },
    BaseNode { ip: "203.45.67.89", region: "ap-northeast-1", status: NodeStatus::Offline, release: Release::MunichV08, performance_base: 0.08 },
];

struct Location {
    city: &'static str,
    country: &'static str,
    latitude: f64,
    longitude: f64,
}

const LOCATIONS: [Location; 10] = [
    Location { city: "New York", country: "United States", latitude: 40.7128, longitude: -74.0060 },
    Location { city: "London", country: "United Kingdom", latitude: 51.5074, longitude: -0.1278 },
    Location { city: "Frankfurt", country: "Germany", latitude: 50.1109, longitude: 8.6821 },
    Location { city: "Mumbai", country: "India", latitude: 19.0760, longitude: 72.8777 },
    Location { city: "São Paulo", country: "Brazil", latitude: -23.5505, longitude: -46.6333 },
    Location { city: "Singapore", country: "Singapore", latitude: 1.3521, longitude: 103.8198 },
    Location { city: "Tokyo", country: "Japan", latitude: 35.6762, longitude: 139.6503 },
    Location { city: "Sydney", country: "Australia", latitude: -33.8688, longitude: 151.2093 },
    Location { city: "Paris", country: "France", latitude: 48.8566, longitude: 2.3522 },
    Location { city: "Toronto", country: "Canada", latitude: 43.6532, longitude: -79.3832 },
];

const PERFORMANCE_JITTER: f64 = 0.05;
const PERFORMANCE_FLOOR: f64 = 0.05;

/// Produces the synthetic node set. Stateless; each call draws fresh jitter
/// from the supplied random source.
pub struct FallbackGenerator;

impl FallbackGenerator {
    pub fn new() -> Self {
        Self
    }

    /// The number of nodes every generated set contains.
    pub fn cardinality(&self) -> usize {
        BASE_NODES.len()
    }

    /// Generate the full synthetic set. Every node satisfies the same
    /// invariants as a live-derived one; only the envelope's provenance tag
    /// tells them apart.
    pub fn generate(&self, now_ms: i64, rng: &mut impl Rng) -> Vec<Node> {
        BASE_NODES
            .iter()
            .enumerate()
            .map(|(index, base)| self.generate_one(index, base, now_ms, rng))
            .collect()
    }

    fn generate_one(
        &self,
        index: usize,
        base: &BaseNode,
        now_ms: i64,
        rng: &mut impl Rng,
    ) -> Node {
        let offline = base.status == NodeStatus::Offline;

        let jitter = (rng.gen::<f64>() - 0.5) * (PERFORMANCE_JITTER * 2.0);
        let performance_score = (base.performance_base + jitter).clamp(PERFORMANCE_FLOOR, 1.0);

        let last_seen = now_ms
            - match base.status {
                NodeStatus::Offline => 3_600_000 + rng.gen_range(0..86_400_000),
                NodeStatus::Degraded => 60_000 + rng.gen_range(0..300_000),
                NodeStatus::Active => rng.gen_range(0..30_000),
            };

        let location = (!offline).then(|| &LOCATIONS[index % LOCATIONS.len()]);

        Node {
            id: synthetic_id(index),
            ip: base.ip.to_string(),
            region: base.region.to_string(),
            status: base.status,
            release: base.release,
            performance_score,
            stoinc: if offline { 0 } else { rng.gen_range(1_000..10_000) },
            has_titan: !offline && index % 3 != 0,
            last_seen,
            is_mock: true,
            latitude: location.map(|l| l.latitude),
            longitude: location.map(|l| l.longitude),
            city: location.map(|l| l.city.to_string()),
            country: location.map(|l| l.country.to_string()),
            requests: Some(rng.gen_range(0..50_000_000_000)),
            requests_per_second: Some(rng.gen_range(0..25_000)),
            cpu: (!offline).then(|| rng.gen_range(20..80) as f64),
            ram_used: (!offline).then(|| rng.gen_range(20..80) as f64 / 10.0),
            ram_total: (!offline).then(|| 8.0),
        }
    }
}

impl Default for FallbackGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable, index-derived identifier padded out to pubkey length.
fn synthetic_id(index: usize) -> String {
    format!("PNODE{:03}{}", index, "x".repeat(36))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnode_types::NodeStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    const NOW_MS: i64 = 1_700_000_000_000;

    #[test]
    fn generates_fixed_cardinality_with_status_mix() {
        let generator = FallbackGenerator::new();
        let nodes = generator.generate(NOW_MS, &mut StdRng::seed_from_u64(1));

        assert_eq!(nodes.len(), generator.cardinality());
        let active = nodes.iter().filter(|n| n.status == NodeStatus::Active).count();
        let degraded = nodes.iter().filter(|n| n.status == NodeStatus::Degraded).count();
        let offline = nodes.iter().filter(|n| n.status == NodeStatus::Offline).count();
        assert_eq!((active, degraded, offline), (7, 3, 2));
    }

    #[test]
    fn structure_is_deterministic_across_calls() {
        let generator = FallbackGenerator::new();
        let first = generator.generate(NOW_MS, &mut StdRng::seed_from_u64(1));
        let second = generator.generate(NOW_MS, &mut StdRng::seed_from_u64(99));

        let tuples = |nodes: &[Node]| {
            nodes
                .iter()
                .map(|n| (n.id.clone(), n.ip.clone(), n.region.clone(), n.status, n.release))
                .collect::<Vec<_>>()
        };
        assert_eq!(tuples(&first), tuples(&second));
    }

    #[test]
    fn jitter_stays_within_documented_bounds() {
        let generator = FallbackGenerator::new();
        for seed in 0..20 {
            let nodes = generator.generate(NOW_MS, &mut StdRng::seed_from_u64(seed));
            for (node, base) in nodes.iter().zip(BASE_NODES.iter()) {
                let lower = (base.performance_base - PERFORMANCE_JITTER).max(PERFORMANCE_FLOOR);
                let upper = (base.performance_base + PERFORMANCE_JITTER).min(1.0);
                assert!(
                    node.performance_score >= lower && node.performance_score <= upper,
                    "score {} outside [{lower}, {upper}] for {}",
                    node.performance_score,
                    node.ip
                );
            }
        }
    }

    #[test]
    fn every_generated_node_satisfies_invariants() {
        let generator = FallbackGenerator::new();
        let nodes = generator.generate(NOW_MS, &mut StdRng::seed_from_u64(42));

        let mut ids = HashSet::new();
        for node in &nodes {
            assert!(!node.id.is_empty());
            assert!(ids.insert(node.id.clone()), "duplicate id {}", node.id);
            assert!(node.ip.parse::<std::net::Ipv4Addr>().is_ok());
            assert!((0.0..=1.0).contains(&node.performance_score));
            if node.status == NodeStatus::Offline {
                assert_eq!(node.stoinc, 0);
                assert!(node.city.is_none() && node.latitude.is_none());
                assert!(!node.has_titan);
            } else {
                assert!((1_000..10_000).contains(&node.stoinc));
                assert!(node.city.is_some() && node.latitude.is_some());
            }
            assert!(node.is_mock);
            assert!(node.last_seen <= NOW_MS);
        }
    }

    #[test]
    fn same_seed_reproduces_the_exact_set() {
        let generator = FallbackGenerator::new();
        let first = generator.generate(NOW_MS, &mut StdRng::seed_from_u64(5));
        let second = generator.generate(NOW_MS, &mut StdRng::seed_from_u64(5));
        assert_eq!(first, second);
    }
}
