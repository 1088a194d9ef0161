//! Errors internal to a single register/heartbeat attempt. These never
//! escape `MembershipClient::run` — every failure here is retried or
//! logged and skipped, per the error handling design.

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("seed returned an empty node id")]
    EmptyId,

    #[error("session lost (401 from seed)")]
    Unauthorized,

    #[error("unexpected status {0} from seed")]
    UnexpectedStatus(reqwest::StatusCode),
}
