//! Node identity.
//!
//! `NodeId` is opaque on purpose: the seed mints it (16 random bytes,
//! hex-encoded) and nothing outside the seed should construct one from
//! scratch. Everything else just carries it around as a comparison key.

use std::fmt;

/// Opaque node identifier, stable for the lifetime of a node's session
/// with the seed. A new registration — including one forced by session
/// loss — yields a new id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps a raw id string as issued by the seed (or received over the
    /// wire). Does not validate length or encoding — callers that mint ids
    /// (the seed) are responsible for the 32-char hex format described in
    /// the data model; callers that only relay ids (everyone else) just
    /// need a comparable, hashable token.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A node as known to the ring: its id plus a reachable `host:port` for
/// peer HTTP. Produced by the seed, carried verbatim by the membership
/// client into `Ring::update`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub address: String,
}

impl NodeInfo {
    pub fn new(id: NodeId, address: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
        }
    }
}
