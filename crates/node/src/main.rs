//! ringkv-node — a single data node: store, ring, membership client,
//! request router, and rebalancer, all in one process.
//!
//! ```text
//! ringkv-node --port 8080 --seed-addr 127.0.0.1:9000 --vnodes 100
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::{oneshot, watch};
use tracing::info;

use membership::MembershipClient;
use rebalancer::Rebalancer;
use ring_core::{NodeId, NodeInfo, Ring};
use router::{build_router, AppState};
use store::ValueMap;

#[derive(Parser)]
#[command(name = "ringkv-node", about = "ringkv data node")]
struct Cli {
    /// Port the HTTP API listens on.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Address of the seed registry, e.g. 127.0.0.1:9000.
    #[arg(long)]
    seed_addr: String,

    /// Virtual nodes per member in the hash ring.
    #[arg(long, default_value_t = 100)]
    vnodes: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,node=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let store = Arc::new(ValueMap::new());
    let ring = Arc::new(Ring::new(cli.vnodes));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (updates_tx, mut updates_rx) = watch::channel::<Vec<NodeInfo>>(Vec::new());
    let (id_tx, id_rx) = oneshot::channel();

    let membership_client = MembershipClient::new(&cli.seed_addr);
    let membership_shutdown = shutdown_rx.clone();
    info!(seed_addr = %cli.seed_addr, "starting discovery");
    let membership_handle = tokio::spawn(
        membership_client.run(updates_tx, membership_shutdown, Some(id_tx)),
    );

    info!("waiting for initial registration");
    let self_id = NodeId::new(id_rx.await.expect("membership client dropped before registering"));
    info!(%self_id, "node registered");

    let rebalancer = Rebalancer::new(store.clone(), ring.clone(), self_id.clone());
    let trigger = rebalancer.trigger_handle();

    // Membership-consumer loop: every published active set updates the
    // ring, then wakes the rebalancer in case ownership shifted.
    let consumer_ring = ring.clone();
    let mut consumer_shutdown = shutdown_rx.clone();
    let consumer_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = updates_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    let active = updates_rx.borrow_and_update().clone();
                    info!(peers = active.len(), "cluster membership updated");
                    consumer_ring.update(&active);
                    trigger.fire();
                }
                _ = consumer_shutdown.changed() => {
                    if *consumer_shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    });

    let rebalancer_shutdown = shutdown_rx.clone();
    let rebalancer_handle = tokio::spawn(rebalancer.run(rebalancer_shutdown));

    let state = AppState::new(store, ring, self_id);
    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    info!(%addr, "HTTP API listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    let _ = membership_handle.await;
    let _ = consumer_handle.await;
    let _ = rebalancer_handle.await;

    info!("ringkv-node stopped");
    Ok(())
}
