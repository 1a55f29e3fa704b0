/*!
 * pNode data acquisition and normalization pipeline.
 *
 * One fetch cycle flows through three components:
 *
 * - [`upstream::UpstreamClient`] performs bounded-timeout calls against the
 *   configured status providers in priority order and returns the first
 *   structurally valid raw batch, or nothing.
 * - [`normalize::normalize_batch`] reshapes each source-specific raw record
 *   into the canonical [`pnode_types::Node`], dropping records that lack a
 *   usable identity or a valid IPv4 address.
 * - [`service::NodeService`] orchestrates the cycle and substitutes the
 *   deterministic [`fallback::FallbackGenerator`] set whenever the live
 *   pipeline yields zero usable nodes, tagging the result's provenance.
 *
 * Failures are contained at the boundary where they occur and converted into
 * `None`/empty sentinels; a fetch cycle never surfaces an error to callers.
 */

pub mod config;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod service;
pub mod upstream;

pub use config::{ServiceConfig, SourceEndpoint, SourceFamily};
pub use error::UpstreamError;
pub use fallback::FallbackGenerator;
pub use service::NodeService;
pub use upstream::{RawBatch, UpstreamClient};
