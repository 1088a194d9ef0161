//! The seed's HTTP surface: `POST /register` and `POST /heartbeat`.
//!
//! Mirrors the convention the data nodes and router rely on: a registering
//! node is addressable at `{its source IP}:8080`, regardless of what port
//! it connected from to reach the seed.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::registry::{NodeDto, Registry};

const DATA_NODE_PORT: u16 = 8080;

pub fn build_router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/heartbeat", post(heartbeat))
        .with_state(registry)
}

#[derive(Serialize)]
struct RegisterResponse {
    id: String,
}

async fn register(
    State(registry): State<Arc<Registry>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Response {
    let addr = format!("{}:{}", peer.ip(), DATA_NODE_PORT);
    let id = registry.register(addr);
    Json(RegisterResponse { id }).into_response()
}

#[derive(Deserialize)]
struct HeartbeatRequest {
    #[serde(default)]
    id: String,
}

#[derive(Serialize)]
struct HeartbeatResponse {
    active_nodes: Vec<NodeDto>,
}

/// Takes the raw body rather than a `Json<HeartbeatRequest>` extractor: a
/// missing content-type, empty body, or malformed JSON must still reach the
/// handler and be treated as an empty id (-> 401), not rejected upstream
/// with a 400/415/422 extractor error.
async fn heartbeat(State(registry): State<Arc<Registry>>, body: axum::body::Bytes) -> Response {
    let id = serde_json::from_slice::<HeartbeatRequest>(&body)
        .map(|req| req.id)
        .unwrap_or_default();

    match registry.heartbeat(&id) {
        Some(active_nodes) => Json(HeartbeatResponse { active_nodes }).into_response(),
        None => (StatusCode::UNAUTHORIZED, "Unknown node").into_response(),
    }
}
