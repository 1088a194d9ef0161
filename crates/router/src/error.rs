//! Error taxonomy for the request router (C5), mapped 1:1 onto the HTTP
//! status codes the data node's API promises.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("key required")]
    MissingKey,

    #[error("no nodes")]
    NoNodes,

    #[error("node address not found")]
    AddressNotFound,

    #[error("proxy failed: {0}")]
    ProxyFailed(#[from] reqwest::Error),

    #[error("already proxied once")]
    AlreadyProxied,

    #[error("not found")]
    NotFound,
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let status = match &self {
            RouterError::MissingKey => StatusCode::BAD_REQUEST,
            RouterError::NoNodes => StatusCode::SERVICE_UNAVAILABLE,
            RouterError::AddressNotFound => StatusCode::INTERNAL_SERVER_ERROR,
            RouterError::ProxyFailed(_) => StatusCode::BAD_GATEWAY,
            RouterError::AlreadyProxied => StatusCode::BAD_GATEWAY,
            RouterError::NotFound => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}
