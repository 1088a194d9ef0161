//! The per-node value map (C1).
//!
//! Deliberately trivial: a concurrent `String -> Vec<u8>` map with no
//! durability and no notion of ownership (the router and rebalancer decide
//! which keys belong here, not this crate). The one rule that matters is
//! that values are defensively copied on the way in and out, so a caller
//! can't mutate storage through a reference it got back from `get`.

use dashmap::DashMap;

#[derive(Default)]
pub struct ValueMap {
    data: DashMap<String, Vec<u8>>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Stores `value` under `key`, replacing any prior value. The stored
    /// copy is independent of the caller's buffer.
    pub fn put(&self, key: &str, value: &[u8]) {
        self.data.insert(key.to_string(), value.to_vec());
    }

    /// Returns a fresh copy of the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    /// Removes `key`. Idempotent: removing an absent key is not an error.
    pub fn delete(&self, key: &str) {
        self.data.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A point-in-time copy of the current keys, for the rebalancer to scan
    /// without holding the map locked for the whole cycle.
    pub fn keys_snapshot(&self) -> Vec<String> {
        self.data.iter().map(|entry| entry.key().clone()).collect()
    }
}
