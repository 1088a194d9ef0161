//! Proxying actually crosses the network: a two-node ring where the
//! requesting node owns nothing, forwarding to a real second process
//! standing in for the owner.

use std::sync::Arc;

use ring_core::{NodeId, NodeInfo, Ring};
use router::{build_router, AppState};
use store::ValueMap;

async fn spawn(app: axum::Router) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn put_is_forwarded_to_the_owning_node_and_readable_there() {
    let owner_store = Arc::new(ValueMap::new());
    let owner_ring = Arc::new(Ring::new(8));
    owner_ring.update(&[NodeInfo::new(NodeId::new("owner"), "placeholder:0".into())]);
    let owner_state = AppState::new(owner_store.clone(), owner_ring.clone(), NodeId::new("owner"));
    let owner_addr = spawn(build_router(owner_state)).await;

    // Now that we know the owner's real address, make it authoritative on
    // both rings.
    owner_ring.update(&[NodeInfo::new(NodeId::new("owner"), owner_addr.to_string())]);

    let front_ring = Arc::new(Ring::new(8));
    front_ring.update(&[NodeInfo::new(NodeId::new("owner"), owner_addr.to_string())]);
    let front_state = AppState::new(Arc::new(ValueMap::new()), front_ring, NodeId::new("front"));
    let front_addr = spawn(build_router(front_state)).await;

    let client = reqwest::Client::new();
    let resp = client
        .put(format!("http://{front_addr}/put?key=shared"))
        .body("forwarded-value")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    assert_eq!(owner_store.get("shared"), Some(b"forwarded-value".to_vec()));

    let resp = client
        .get(format!("http://{front_addr}/get?key=shared"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "forwarded-value");
}

#[tokio::test]
async fn keys_with_reserved_query_characters_survive_the_proxy_hop() {
    let owner_store = Arc::new(ValueMap::new());
    let owner_ring = Arc::new(Ring::new(8));
    owner_ring.update(&[NodeInfo::new(NodeId::new("owner"), "placeholder:0".into())]);
    let owner_state = AppState::new(owner_store.clone(), owner_ring.clone(), NodeId::new("owner"));
    let owner_addr = spawn(build_router(owner_state)).await;
    owner_ring.update(&[NodeInfo::new(NodeId::new("owner"), owner_addr.to_string())]);

    let front_ring = Arc::new(Ring::new(8));
    front_ring.update(&[NodeInfo::new(NodeId::new("owner"), owner_addr.to_string())]);
    let front_state = AppState::new(Arc::new(ValueMap::new()), front_ring, NodeId::new("front"));
    let front_addr = spawn(build_router(front_state)).await;

    let client = reqwest::Client::new();
    // The incoming request already decoded `%26` to `&`; the key this
    // handler sees is the literal string "a&b". Forwarding it to the owner
    // must not let that `&` be reinterpreted as a second query parameter.
    let resp = client
        .put(format!("http://{front_addr}/put?key=a%26b"))
        .body("value-with-ampersand-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    assert_eq!(
        owner_store.get("a&b"),
        Some(b"value-with-ampersand-key".to_vec())
    );
    assert!(owner_store.get("a").is_none());

    let resp = client
        .get(format!("http://{front_addr}/get?key=a%26b"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "value-with-ampersand-key");
}
