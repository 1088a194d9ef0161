//! Per-key migration failures. These never propagate out of a cycle —
//! [`crate::Rebalancer::run_cycle`] counts them and moves on to the next key.

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("target node returned status {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("no address on file for target node")]
    AddressNotFound,
}
