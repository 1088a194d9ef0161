//! The in-memory membership registry (C4 core).
//!
//! One process, one map, guarded by a single lock — there is no
//! replication or persistence here by design; if the seed restarts, every
//! data node simply re-registers on its next heartbeat failure.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::RngCore;

#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub addr: String,
    last_seen: Instant,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct NodeDto {
    pub id: String,
    pub addr: String,
}

#[derive(Default)]
pub struct Registry {
    nodes: Mutex<HashMap<String, NodeRecord>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            nodes: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a new member at `addr` and returns its freshly minted id.
    /// Collisions in the 128-bit id space are not checked for; they are
    /// not going to happen.
    pub fn register(&self, addr: String) -> String {
        let id = generate_id();
        let mut nodes = self.nodes.lock().expect("registry mutex poisoned");
        nodes.insert(
            id.clone(),
            NodeRecord {
                addr,
                last_seen: Instant::now(),
            },
        );
        id
    }

    /// Refreshes `id`'s last-seen time and returns the full active set, or
    /// `None` if `id` is not a known member (the caller should answer 401).
    pub fn heartbeat(&self, id: &str) -> Option<Vec<NodeDto>> {
        let mut nodes = self.nodes.lock().expect("registry mutex poisoned");
        if let Some(record) = nodes.get_mut(id) {
            record.last_seen = Instant::now();
        } else {
            return None;
        }

        Some(
            nodes
                .iter()
                .map(|(id, record)| NodeDto {
                    id: id.clone(),
                    addr: record.addr.clone(),
                })
                .collect(),
        )
    }

    /// Drops every member not heard from within `expiry`.
    pub fn sweep(&self, expiry: Duration) {
        let mut nodes = self.nodes.lock().expect("registry mutex poisoned");
        let now = Instant::now();
        nodes.retain(|_, record| now.duration_since(record.last_seen) <= expiry);
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().expect("registry mutex poisoned").len()
    }
}

fn generate_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
