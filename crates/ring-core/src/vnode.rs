//! Virtual node positions on the ring.

use crate::node::NodeId;

/// One of the `K` copies of a physical node placed on the ring. Ordered by
/// `hash` alone — two vnodes with the same hash never coexist (the
/// collision policy in [`crate::ring::Ring`] keeps only the first insert).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualNode {
    pub hash: u32,
    pub node_id: NodeId,
}

impl VirtualNode {
    pub fn new(hash: u32, node_id: NodeId) -> Self {
        Self { hash, node_id }
    }
}
