//! Errors surfaced by the ring.

use crate::node::NodeId;

pub type Result<T> = std::result::Result<T, RingError>;

/// Failure modes for ring lookups. Both map to specific HTTP statuses at
/// the router (503 and 500 respectively) — see the router crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    #[error("ring has no members")]
    EmptyRing,

    #[error("no known address for node {0}")]
    UnknownNode(NodeId),
}
