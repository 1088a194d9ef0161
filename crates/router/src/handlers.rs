//! The C5 request router: local reads/writes against the store the ring
//! says this node owns, single-hop proxying to whichever node does own a
//! key, and the `/internal/put` escape hatch the rebalancer lands keys
//! through.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::Router;
use serde::Deserialize;
use tracing::{debug, warn};

use ring_core::{NodeId, Ring};
use store::ValueMap;

use crate::error::RouterError;

/// Set on an outbound proxy request and checked on the way in: a request
/// that already carries this header has already taken one hop and must
/// not be proxied again.
pub const PROXIED_HEADER: &str = "x-ringkv-proxied";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ValueMap>,
    pub ring: Arc<Ring>,
    pub self_id: NodeId,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(store: Arc<ValueMap>, ring: Arc<Ring>, self_id: NodeId) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("reqwest client builds with static config");
        Self {
            store,
            ring,
            self_id,
            client,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/put", put(put_handler))
        .route("/get", get(get_handler))
        .route("/delete", delete(delete_handler))
        .route("/health", get(health_handler))
        .route("/internal/put", put(internal_put_handler))
        .with_state(state)
}

#[derive(Deserialize)]
struct KeyParam {
    key: Option<String>,
}

fn require_key(params: &KeyParam) -> Result<&str, RouterError> {
    match params.key.as_deref() {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(RouterError::MissingKey),
    }
}

async fn put_handler(
    State(state): State<AppState>,
    Query(params): Query<KeyParam>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Response, RouterError> {
    let key = require_key(&params)?;

    let owner = state.ring.primary(key.as_bytes()).map_err(|_| RouterError::NoNodes)?;
    if owner != state.self_id {
        return proxy(&state, Method::PUT, "/put", key, headers, body).await;
    }

    state.store.put(key, &body);
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn get_handler(
    State(state): State<AppState>,
    Query(params): Query<KeyParam>,
    headers: HeaderMap,
) -> Result<Response, RouterError> {
    let key = require_key(&params)?;

    let owner = state.ring.primary(key.as_bytes()).map_err(|_| RouterError::NoNodes)?;
    if owner != state.self_id {
        return proxy(&state, Method::GET, "/get", key, headers, axum::body::Bytes::new()).await;
    }

    match state.store.get(key) {
        Some(value) => Ok((StatusCode::OK, value).into_response()),
        None => Err(RouterError::NotFound),
    }
}

async fn delete_handler(
    State(state): State<AppState>,
    Query(params): Query<KeyParam>,
    headers: HeaderMap,
) -> Result<Response, RouterError> {
    let key = require_key(&params)?;

    let owner = state.ring.primary(key.as_bytes()).map_err(|_| RouterError::NoNodes)?;
    if owner != state.self_id {
        return proxy(
            &state,
            Method::DELETE,
            "/delete",
            key,
            headers,
            axum::body::Bytes::new(),
        )
        .await;
    }

    state.store.delete(key);
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn health_handler() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// The rebalancer's landing zone: always stores locally, never consults
/// the ring, never proxies. This route is what `original_source`'s router
/// forgot to register.
async fn internal_put_handler(
    State(state): State<AppState>,
    Query(params): Query<KeyParam>,
    body: axum::body::Bytes,
) -> Result<Response, RouterError> {
    let key = require_key(&params)?;
    state.store.put(key, &body);
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Forwards a request to `target`'s owner, exactly one hop. Requests that
/// arrive already proxied are refused rather than forwarded again.
async fn proxy(
    state: &AppState,
    method: Method,
    path: &str,
    key: &str,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Response, RouterError> {
    if headers.contains_key(PROXIED_HEADER) {
        warn!(%key, "refusing to proxy an already-proxied request");
        return Err(RouterError::AlreadyProxied);
    }

    let owner = state
        .ring
        .primary(key.as_bytes())
        .map_err(|_| RouterError::NoNodes)?;
    let target_addr = state
        .ring
        .address_of(&owner)
        .map_err(|_| RouterError::AddressNotFound)?;

    let url = format!("http://{target_addr}{path}");
    debug!(%url, %key, "proxying request");

    let mut req = state
        .client
        .request(method, &url)
        .query(&[("key", key)])
        .body(body);
    for (name, value) in headers.iter() {
        if name == axum::http::header::HOST || name == axum::http::header::CONTENT_LENGTH {
            continue;
        }
        req = req.header(name.clone(), value.clone());
    }
    req = req.header(PROXIED_HEADER, HeaderValue::from_static("1"));

    let resp = req.send().await?;
    let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let resp_headers = resp.headers().clone();
    let body = resp.bytes().await?;

    let mut response = (status, body).into_response();
    for (name, value) in resp_headers.iter() {
        if name == reqwest::header::CONTENT_LENGTH || name == reqwest::header::TRANSFER_ENCODING {
            continue;
        }
        let Ok(name) = axum::http::HeaderName::from_bytes(name.as_str().as_bytes()) else {
            continue;
        };
        if let Ok(value) = HeaderValue::from_bytes(value.as_bytes()) {
            response.headers_mut().append(name, value);
        }
    }
    Ok(response)
}
