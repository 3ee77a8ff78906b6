//! Gateway — the main event loop connecting channels to the negotiation
//! tracker and the download collaborators.
//!
//! Includes: channel fan-in, per-message dispatch, the optional HTTP API,
//! and graceful shutdown.

mod pipeline;

use reelbot_core::{
    config::ApiConfig,
    message::{IncomingMessage, OutgoingMessage},
    negotiation::NegotiationTracker,
    traits::{Channel, Downloader},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// The central gateway that routes messages between channels and the tracker.
pub struct Gateway {
    pub(super) channels: HashMap<String, Arc<dyn Channel>>,
    pub(super) tracker: NegotiationTracker,
    pub(super) downloader: Arc<dyn Downloader>,
    pub(super) api_config: ApiConfig,
    pub(super) data_dir: String,
    pub(super) uptime: Instant,
}

impl Gateway {
    pub fn new(
        channels: HashMap<String, Arc<dyn Channel>>,
        tracker: NegotiationTracker,
        downloader: Arc<dyn Downloader>,
        api_config: ApiConfig,
        data_dir: String,
    ) -> Self {
        Self {
            channels,
            tracker,
            downloader,
            api_config,
            data_dir,
            uptime: Instant::now(),
        }
    }

    /// Run the main event loop.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Reelbot gateway running | channels: {}",
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
        );

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        // Spawn HTTP API server.
        let api_handle = if self.api_config.enabled {
            let api_cfg = self.api_config.clone();
            let names: Vec<String> = self.channels.keys().cloned().collect();
            let api_uptime = self.uptime;
            Some(tokio::spawn(async move {
                crate::api::serve(api_cfg, names, api_uptime).await;
            }))
        } else {
            None
        };

        // Main event loop with graceful shutdown.
        loop {
            tokio::select! {
                Some(incoming) = rx.recv() => {
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.handle_message(incoming).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(&api_handle).await;
        Ok(())
    }

    /// Graceful shutdown: stop background tasks and channels.
    async fn shutdown(&self, api_handle: &Option<tokio::task::JoinHandle<()>>) {
        info!("Shutting down...");

        if let Some(h) = api_handle {
            h.abort();
        }

        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }

        info!("Shutdown complete.");
    }

    /// Send a plain text message back to the sender.
    pub(super) async fn send_text(&self, incoming: &IncomingMessage, text: &str) {
        let msg = OutgoingMessage {
            text: text.to_string(),
            reply_target: incoming.reply_target.clone(),
        };

        if let Some(channel) = self.channels.get(&incoming.channel) {
            if let Err(e) = channel.send(msg).await {
                error!("failed to send message: {e}");
            }
        }
    }
}
