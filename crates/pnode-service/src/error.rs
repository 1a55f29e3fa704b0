//! Error types for the upstream fetch boundary.
//!
//! These never cross the aggregation boundary: the client logs them and
//! collapses every failure into `None`, per the availability contract.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("Unexpected payload shape: {0}")]
    Shape(String),

    #[error("Upstream returned an empty node list")]
    Empty,
}
