//! The ring's hash function.
//!
//! Fixed by the data model, not pluggable: ownership is derived from the
//! first four bytes of MD5, interpreted as a big-endian u32. Any other hash
//! (even a better one) would assign different owners to the same keys, so
//! this is not a place to get creative.

use md5::{Digest, Md5};

use crate::node::NodeId;

/// Hashes arbitrary bytes into the ring's 32-bit token space.
pub fn hash_bytes(data: &[u8]) -> u32 {
    let digest = Md5::digest(data);
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Hashes a client key into the ring's token space.
pub fn hash_key(key: &[u8]) -> u32 {
    hash_bytes(key)
}

/// Derives the hash for virtual node `index` of `node_id`, from the string
/// `"{node_id}#{index}"` — this exact format is load-bearing, since two
/// independently-running nodes must derive identical vnode positions for
/// the same id.
pub fn vnode_hash(node_id: &NodeId, index: u32) -> u32 {
    let key = format!("{node_id}#{index}");
    hash_bytes(key.as_bytes())
}
