use crate::{
    error::{ExtractError, ReelError},
    media::VideoMeta,
    message::{IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Messaging Channel trait — the transport boundary.
///
/// Every messaging platform (Telegram, etc.) implements this trait to
/// receive and send messages; it owns connection lifecycle and retries.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, ReelError>;

    /// Send a text response back through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), ReelError>;

    /// Send a typing/upload indicator to show the bot is working.
    async fn send_typing(&self, _target: &str) -> Result<(), ReelError> {
        Ok(())
    }

    /// Send a video (container bytes) with a caption.
    async fn send_video(
        &self,
        target: &str,
        video: &[u8],
        caption: &str,
    ) -> Result<(), ReelError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), ReelError>;
}

/// Metadata extraction collaborator — given a URL, reports title, duration,
/// and the available renditions.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn probe(&self, url: &str) -> Result<VideoMeta, ExtractError>;
}

/// Media fetch collaborator — retrieves the media for a chosen quality token
/// to an output location and returns the path actually written.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn fetch(&self, url: &str, format_id: &str, dest: &Path) -> Result<PathBuf, ReelError>;
}
