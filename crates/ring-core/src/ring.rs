//! The consistent hash ring (C2).
//!
//! # Concurrency
//!
//! The ring is stored as `RwLock<Arc<RingState>>` rather than a lock held
//! for the duration of a lookup. A writer builds a brand new `RingState`
//! and swaps the `Arc` in under the write lock; a reader takes the read
//! lock just long enough to clone the `Arc` (a pointer bump) and then works
//! against its own private, immutable snapshot. This is the copy-on-write
//! discipline recommended in the design notes: readers never block on, or
//! observe, a ring mid-update.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, RingError};
use crate::hash::{hash_key, vnode_hash};
use crate::node::{NodeId, NodeInfo};
use crate::vnode::VirtualNode;

#[derive(Clone, Debug, Default)]
struct RingState {
    /// Virtual nodes sorted by hash, strictly non-decreasing.
    ordered: Vec<VirtualNode>,
    /// Every hash in `ordered` has an entry here.
    hash_to_node: HashMap<u32, NodeId>,
    /// Every `NodeId` appearing in `hash_to_node` has an entry here.
    node_addr: HashMap<NodeId, String>,
}

/// Consistent hash ring mapping keys to the node responsible for them.
///
/// Construct one per process with the configured virtual-node count, then
/// feed it membership snapshots via [`Ring::update`] as they arrive from the
/// membership client. `primary` and `address_of` are safe to call
/// concurrently with `update` and with each other.
pub struct Ring {
    vnodes_per_node: u32,
    inner: RwLock<Arc<RingState>>,
}

impl Ring {
    pub fn new(vnodes_per_node: u32) -> Self {
        Self {
            vnodes_per_node,
            inner: RwLock::new(Arc::new(RingState::default())),
        }
    }

    fn snapshot(&self) -> Arc<RingState> {
        self.inner.read().clone()
    }

    /// Idempotently replaces membership with `active`. Safe to call with
    /// the same set repeatedly (a no-op after the first call) and safe to
    /// call concurrently with readers.
    ///
    /// See the data model's collision policy: arrivals whose derived vnode
    /// hash already exists in the ring are silently skipped rather than
    /// overwriting the earlier insert.
    pub fn update(&self, active: &[NodeInfo]) {
        let current = self.snapshot();

        let active_by_id: HashMap<&NodeId, &str> = active
            .iter()
            .map(|info| (&info.id, info.address.as_str()))
            .collect();

        let departed: HashSet<NodeId> = current
            .node_addr
            .keys()
            .filter(|id| !active_by_id.contains_key(id))
            .cloned()
            .collect();

        let arrived: Vec<&NodeInfo> = active
            .iter()
            .filter(|info| !current.node_addr.contains_key(&info.id))
            .collect();

        if departed.is_empty() && arrived.is_empty() {
            // Still need to pick up address-only changes for existing members.
            if active.iter().all(|info| {
                current.node_addr.get(&info.id) == Some(&info.address)
            }) {
                return;
            }
        }

        let mut node_addr = current.node_addr.clone();
        let mut hash_to_node = current.hash_to_node.clone();
        let mut ordered = current.ordered.clone();
        let mut changed = false;

        if !departed.is_empty() {
            for id in &departed {
                node_addr.remove(id);
            }
            ordered.retain(|vnode| {
                if departed.contains(&vnode.node_id) {
                    hash_to_node.remove(&vnode.hash);
                    false
                } else {
                    true
                }
            });
            changed = true;
        }

        for info in &arrived {
            node_addr.insert(info.id.clone(), info.address.clone());
            for i in 0..self.vnodes_per_node {
                let h = vnode_hash(&info.id, i);
                if hash_to_node.contains_key(&h) {
                    continue;
                }
                hash_to_node.insert(h, info.id.clone());
                ordered.push(VirtualNode::new(h, info.id.clone()));
            }
            changed = true;
        }

        // Members present before and after: rewrite the address only, no
        // ring reshaping.
        for info in active {
            if arrived.iter().any(|a| a.id == info.id) {
                continue;
            }
            if let Some(addr) = node_addr.get_mut(&info.id) {
                if *addr != info.address {
                    *addr = info.address.clone();
                }
            }
        }

        if changed {
            ordered.sort_by_key(|vnode| vnode.hash);
        }

        let next = Arc::new(RingState {
            ordered,
            hash_to_node,
            node_addr,
        });
        *self.inner.write() = next;
    }

    /// The node responsible for `key`: the first virtual node whose hash is
    /// `>=` the key's hash, wrapping around to index 0 if none qualify.
    pub fn primary(&self, key: &[u8]) -> Result<NodeId> {
        let snapshot = self.snapshot();
        if snapshot.ordered.is_empty() {
            return Err(RingError::EmptyRing);
        }
        let h = hash_key(key);
        let idx = snapshot.ordered.partition_point(|vnode| vnode.hash < h);
        let idx = if idx == snapshot.ordered.len() { 0 } else { idx };
        Ok(snapshot.ordered[idx].node_id.clone())
    }

    pub fn address_of(&self, id: &NodeId) -> Result<String> {
        let snapshot = self.snapshot();
        snapshot
            .node_addr
            .get(id)
            .cloned()
            .ok_or_else(|| RingError::UnknownNode(id.clone()))
    }

    pub fn node_count(&self) -> usize {
        self.snapshot().node_addr.len()
    }

    pub fn vnode_count(&self) -> usize {
        self.snapshot().ordered.len()
    }

    pub fn members(&self) -> Vec<NodeInfo> {
        self.snapshot()
            .node_addr
            .iter()
            .map(|(id, addr)| NodeInfo::new(id.clone(), addr.clone()))
            .collect()
    }
}
