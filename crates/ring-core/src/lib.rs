//! Shared data model and consistent hash ring for ringkv.
//!
//! This crate is the thing every other crate in the workspace depends on:
//! the `NodeId`/`NodeInfo` types that flow between the seed, the membership
//! client, the router and the rebalancer, and the `Ring` itself — the
//! structure that turns a key into the node responsible for it.

pub mod error;
pub mod hash;
pub mod node;
pub mod ring;
pub mod vnode;

pub use error::{Result, RingError};
pub use node::{NodeId, NodeInfo};
pub use ring::Ring;
pub use vnode::VirtualNode;
