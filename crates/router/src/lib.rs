//! The C5 request router for a ringkv data node.
//!
//! Every request names a key; the router asks the ring who owns it, serves
//! it locally if that's us, or forwards it exactly one hop if it isn't.

pub mod error;
pub mod handlers;

pub use error::RouterError;
pub use handlers::{build_router, AppState, PROXIED_HEADER};

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use ring_core::{NodeId, NodeInfo, Ring};
    use store::ValueMap;

    fn single_node_state(self_id: &str) -> AppState {
        let ring = Arc::new(Ring::new(8));
        ring.update(&[NodeInfo::new(NodeId::new(self_id), "127.0.0.1:8080")]);
        AppState::new(Arc::new(ValueMap::new()), ring, NodeId::new(self_id))
    }

    #[tokio::test]
    async fn put_then_get_roundtrips_locally() {
        let app = build_router(single_node_state("n1"));

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/put?key=hello")
                    .body(Body::from("world"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/get?key=hello")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"world");
    }

    #[tokio::test]
    async fn get_missing_key_is_404() {
        let app = build_router(single_node_state("n1"));
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/get?key=absent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_key_param_is_400() {
        let app = build_router(single_node_state("n1"));
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/get")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_ring_is_503() {
        let ring = Arc::new(Ring::new(8));
        let state = AppState::new(Arc::new(ValueMap::new()), ring, NodeId::new("n1"));
        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/get?key=anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn internal_put_stores_without_consulting_the_ring() {
        // `self_id` owns nothing in this ring, so a normal `/put` would
        // proxy; `/internal/put` must still store locally.
        let ring = Arc::new(Ring::new(8));
        ring.update(&[NodeInfo::new(NodeId::new("someone-else"), "10.0.0.9:8080")]);
        let store = Arc::new(ValueMap::new());
        let state = AppState::new(store.clone(), ring, NodeId::new("n1"));
        let app = build_router(state);

        let resp = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/internal/put?key=landed")
                    .body(Body::from("value"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(store.get("landed"), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn already_proxied_request_is_not_forwarded_again() {
        let ring = Arc::new(Ring::new(8));
        ring.update(&[NodeInfo::new(NodeId::new("someone-else"), "127.0.0.1:1")]);
        let state = AppState::new(Arc::new(ValueMap::new()), ring, NodeId::new("n1"));
        let app = build_router(state);

        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/get?key=whatever")
                    .header(PROXIED_HEADER, "1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let app = build_router(single_node_state("n1"));
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
