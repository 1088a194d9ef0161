//! The background rebalancer (C6).
//!
//! Woken whenever membership changes, it walks a snapshot of the local
//! store, hands any key the ring now says belongs elsewhere to its new
//! owner, and deletes its own copy only after the handoff is acknowledged.
//! The handoff is PUT-then-DELETE, never the reverse: a crash between the
//! two leaves the key duplicated, never lost.

pub mod error;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Notify};
use tracing::{info, warn};

use error::MigrationError;
use ring_core::{NodeId, Ring};
use store::ValueMap;

const CALL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub moved: usize,
    pub errors: usize,
}

/// Handle used to wake the rebalancer. Cloning it is cheap; hand a clone to
/// the membership-consumer loop so it can call [`RebalanceTrigger::fire`]
/// after every `Ring::update`.
#[derive(Clone)]
pub struct RebalanceTrigger {
    notify: Arc<Notify>,
}

impl RebalanceTrigger {
    /// Requests a cycle. Any number of calls between two cycles collapse
    /// into a single pending wakeup — this is a single-slot, coalescing
    /// trigger, not a queue.
    pub fn fire(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone)]
pub struct Rebalancer {
    store: Arc<ValueMap>,
    ring: Arc<Ring>,
    self_id: NodeId,
    client: reqwest::Client,
    notify: Arc<Notify>,
}

impl Rebalancer {
    pub fn new(store: Arc<ValueMap>, ring: Arc<Ring>, self_id: NodeId) -> Self {
        let client = reqwest::Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .expect("reqwest client builds with static config");
        Self {
            store,
            ring,
            self_id,
            client,
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn trigger_handle(&self) -> RebalanceTrigger {
        RebalanceTrigger {
            notify: self.notify.clone(),
        }
    }

    /// Blocks waiting for a trigger, runs one cycle, repeats, until
    /// `shutdown` signals true.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = self.notify.notified() => {
                    let summary = self.run_cycle(&shutdown).await;
                    info!(moved = summary.moved, errors = summary.errors, "rebalance cycle finished");
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("rebalancer shutting down");
                        return;
                    }
                }
            }
        }
    }

    /// Walks a point-in-time snapshot of local keys, moving any whose
    /// current owner isn't us. Keys that arrive or get deleted mid-cycle
    /// are simply not in the snapshot and are left for the next trigger.
    ///
    /// `shutdown` is checked between keys (not just between cycles): once
    /// it flips to true, the cycle returns after letting its in-flight HTTP
    /// call (if any) finish, rather than ploughing through the rest of the
    /// snapshot at up to 5s per unreachable key.
    pub async fn run_cycle(&self, shutdown: &watch::Receiver<bool>) -> CycleSummary {
        let started = Instant::now();
        let keys = self.store.keys_snapshot();
        let mut summary = CycleSummary::default();

        for key in keys {
            if *shutdown.borrow() {
                info!("rebalance cycle cancelled by shutdown");
                break;
            }

            let owner = match self.ring.primary(key.as_bytes()) {
                Ok(owner) => owner,
                Err(_) => continue,
            };
            if owner == self.self_id {
                continue;
            }

            let Some(value) = self.store.get(&key) else {
                continue;
            };

            match self.move_key(&key, &value, &owner).await {
                Ok(()) => {
                    self.store.delete(&key);
                    summary.moved += 1;
                }
                Err(err) => {
                    warn!(%key, %owner, error = %err, "failed to migrate key");
                    summary.errors += 1;
                }
            }
        }

        let elapsed = started.elapsed();
        tracing::debug!(?elapsed, "rebalance cycle body complete");
        summary
    }

    async fn move_key(&self, key: &str, value: &[u8], owner: &NodeId) -> Result<(), MigrationError> {
        let target_addr = self
            .ring
            .address_of(owner)
            .map_err(|_| MigrationError::AddressNotFound)?;

        let url = format!("http://{target_addr}/internal/put");
        let resp = self
            .client
            .put(&url)
            .query(&[("key", key)])
            .body(value.to_vec())
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(MigrationError::UnexpectedStatus(resp.status()))
        }
    }
}
