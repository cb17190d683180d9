//! Unread notification polling
//!
//! Fixed-interval poller for the backend unread count. No jitter, no
//! backoff, no coalescing: volumes are low and a failed poll just means
//! the count updates one interval later.

use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use tokio::sync::{broadcast, watch};
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::api::ApiClient;

#[derive(Debug, Deserialize)]
struct UnreadCountResponse {
    count: u64,
}

/// Fetch the unread notification count once.
pub async fn fetch_unread_count(client: &ApiClient) -> Result<u64> {
    let response: UnreadCountResponse = client.get("/notifications/unread-count/").await?;
    Ok(response.count)
}

/// Periodically polls the backend and publishes the latest count on a
/// watch channel.
pub struct NotificationPoller {
    client: Arc<ApiClient>,
    interval_secs: u64,
    count_tx: watch::Sender<u64>,
    shutdown_tx: broadcast::Sender<()>,
}

impl NotificationPoller {
    pub fn new(client: Arc<ApiClient>, interval_secs: u64) -> Self {
        let (count_tx, _) = watch::channel(0);
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            client,
            interval_secs,
            count_tx,
            shutdown_tx,
        }
    }

    /// Subscribe to count updates. Starts at zero until the first
    /// successful poll.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.count_tx.subscribe()
    }

    /// Spawn the polling loop.
    pub fn start(&self) {
        let client = self.client.clone();
        let interval_secs = self.interval_secs;
        let count_tx = self.count_tx.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            info!("Notification poller started ({}s interval)", interval_secs);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("Notification poller stopping");
                        break;
                    }

                    _ = interval.tick() => {
                        match fetch_unread_count(&client).await {
                            Ok(count) => {
                                let _ = count_tx.send(count);
                            }
                            Err(e) => warn!("Unread count poll failed: {}", e),
                        }
                    }
                }
            }
        });
    }

    /// Signal the loop to stop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
