//! ringkv-seed — the cluster's membership rendezvous point.
//!
//! ```text
//! ringkv-seed --port 9000 --expiry-secs 15 --sweep-interval-secs 2
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use seed::http::build_router;
use seed::Registry;

#[derive(Parser)]
#[command(name = "ringkv-seed", about = "ringkv membership seed")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 9000)]
    port: u16,

    /// A member is dropped once it hasn't heartbeated in this many seconds.
    #[arg(long, default_value_t = 15)]
    expiry_secs: u64,

    /// How often to scan for expired members, in seconds.
    #[arg(long, default_value_t = 2)]
    sweep_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,seed=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let registry = Arc::new(Registry::new());

    let sweep_registry = registry.clone();
    let expiry = Duration::from_secs(cli.expiry_secs);
    let sweep_interval = Duration::from_secs(cli.sweep_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            sweep_registry.sweep(expiry);
        }
    });

    let router = build_router(registry);
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    info!(%addr, expiry_secs = cli.expiry_secs, "seed listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
    })
    .await?;

    info!("seed stopped");
    Ok(())
}
