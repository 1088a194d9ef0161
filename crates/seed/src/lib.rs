//! The ringkv seed (C4): a single-process membership registry.
//!
//! Data nodes register here once and heartbeat on a fixed interval; the
//! seed answers with the full active set and sweeps anyone who stops
//! heartbeating. There is deliberately no replication of this state —
//! the seed is a well-known rendezvous point, not a highly-available
//! control plane.

pub mod http;
pub mod registry;

pub use registry::Registry;
