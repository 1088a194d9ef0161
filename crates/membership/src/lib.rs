//! Membership client for ringkv data nodes.
//!
//! A data node doesn't maintain cluster membership itself; it asks the seed
//! who's alive, on a fixed heartbeat cadence, and publishes the answer for
//! the ring and router to consume. See [`client::MembershipClient`].

pub mod client;
pub mod dto;
pub mod error;

pub use client::MembershipClient;
pub use error::ClientError;
