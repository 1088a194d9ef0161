//! The membership client (C3): register once, heartbeat forever, publish
//! the active set to whoever's listening.
//!
//! # State machine
//!
//! ```text
//! Unregistered --register ok--> Registered
//! Unregistered --register err--> Unregistered (retry after 2s)
//! Registered   --heartbeat ok--> Registered
//! Registered   --heartbeat 401--> Unregistered (re-register, retry heartbeat once)
//! ```
//!
//! There is no terminal state; this runs for the life of the process.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use ring_core::NodeInfo;

use crate::dto::{HeartbeatRequest, HeartbeatResponse, RegisterResponse};
use crate::error::ClientError;

const REGISTER_RETRY_DELAY: Duration = Duration::from_secs(2);
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CALL_TIMEOUT: Duration = Duration::from_secs(3);

pub struct MembershipClient {
    seed_url: String,
    http: reqwest::Client,
}

impl MembershipClient {
    pub fn new(seed_addr: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .expect("reqwest client builds with static config");
        Self {
            seed_url: format!("http://{seed_addr}"),
            http,
        }
    }

    /// One `POST /register`. An empty id in a 200 response is treated as
    /// failure, matching the seed's contract.
    async fn register_once(&self) -> Result<String, ClientError> {
        let resp = self
            .http
            .post(format!("{}/register", self.seed_url))
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ClientError::UnexpectedStatus(resp.status()));
        }

        let parsed: RegisterResponse = resp.json().await?;
        if parsed.id.is_empty() {
            return Err(ClientError::EmptyId);
        }
        Ok(parsed.id)
    }

    /// Retries `register_once` indefinitely on a fixed 2s backoff until it
    /// succeeds.
    async fn ensure_registered(&self) -> String {
        loop {
            match self.register_once().await {
                Ok(id) => {
                    info!(node_id = %id, "registered with seed");
                    return id;
                }
                Err(err) => {
                    warn!(error = %err, "registration failed, retrying");
                    tokio::time::sleep(REGISTER_RETRY_DELAY).await;
                }
            }
        }
    }

    /// One `POST /heartbeat`.
    async fn heartbeat_once(&self, id: &str) -> Result<Vec<NodeInfo>, ClientError> {
        let resp = self
            .http
            .post(format!("{}/heartbeat", self.seed_url))
            .json(&HeartbeatRequest { id: id.to_string() })
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !resp.status().is_success() {
            return Err(ClientError::UnexpectedStatus(resp.status()));
        }

        let parsed: HeartbeatResponse = resp.json().await?;
        Ok(parsed.active_nodes.into_iter().map(Into::into).collect())
    }

    /// Runs one heartbeat tick, handling the 401 re-registration dance:
    /// on session loss, re-register and retry the heartbeat exactly once.
    /// Returns the (possibly refreshed) node id and the active set to
    /// publish, or `None` if nothing should be published this tick.
    async fn tick(&self, id: String) -> (String, Option<Vec<NodeInfo>>) {
        match self.heartbeat_once(&id).await {
            Ok(active) => (id, Some(active)),
            Err(ClientError::Unauthorized) => {
                warn!("session lost, re-registering");
                let new_id = self.ensure_registered().await;
                match self.heartbeat_once(&new_id).await {
                    Ok(active) => (new_id, Some(active)),
                    Err(err) => {
                        warn!(error = %err, "heartbeat after re-registration failed");
                        (new_id, None)
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "heartbeat failed, skipping this tick");
                (id, None)
            }
        }
    }

    /// Drives the client for the life of the process: register, then
    /// heartbeat on a fixed interval, publishing each accepted active set
    /// to `updates`. `updates` is a `watch` channel, so a slow consumer
    /// only ever observes the most recent active set — the single-slot,
    /// drop-newest-on-full semantics the design calls for.
    ///
    /// `id_tx`, if present, is fired with the assigned node id as soon as
    /// registration completes — the caller typically needs that id (to
    /// build its `self_id` for the router) well before the run loop would
    /// otherwise return it.
    ///
    /// Returns the final node id this client was registered under, once
    /// `shutdown` signals true.
    pub async fn run(
        self,
        updates: watch::Sender<Vec<NodeInfo>>,
        mut shutdown: watch::Receiver<bool>,
        id_tx: Option<tokio::sync::oneshot::Sender<String>>,
    ) -> String {
        let mut id = self.ensure_registered().await;
        if let Some(id_tx) = id_tx {
            let _ = id_tx.send(id.clone());
        }

        // Heartbeat immediately so the node has an initial active set
        // before the first tick of the interval.
        if let (new_id, Some(active)) = self.tick(id.clone()).await {
            id = new_id;
            debug!(count = active.len(), "initial active set published");
            let _ = updates.send(active);
        }

        let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
        ticker.tick().await; // first tick fires immediately; already handled above

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let (new_id, active) = self.tick(id.clone()).await;
                    id = new_id;
                    if let Some(active) = active {
                        let _ = updates.send(active);
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("membership client shutting down");
                        break;
                    }
                }
            }
        }

        id
    }
}
