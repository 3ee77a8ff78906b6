//! Per-message processing: commands, link recognition, choice resolution,
//! and media delivery.

use super::Gateway;
use reelbot_core::{
    error::{ChoiceError, ExtractError},
    links,
    message::IncomingMessage,
    negotiation::{ChosenOffer, OfferList},
};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const HELP_TEXT: &str = "Send me a YouTube link and I'll fetch the video for you.\n\n\
    1. Paste a link (youtube.com/watch or youtu.be)\n\
    2. Pick a quality from the list I send back\n\
    3. Receive the video right here\n\n\
    Videos longer than 10 minutes are not supported.";

impl Gateway {
    /// Process one incoming message through the full pipeline.
    pub(super) async fn handle_message(&self, incoming: IncomingMessage) {
        let text = incoming.text.trim();
        let sender_key = format!("{}:{}", incoming.channel, incoming.sender_id);

        if matches!(text, "/start" | "/help" | ".help") {
            self.send_text(&incoming, HELP_TEXT).await;
            return;
        }

        if let Some(url) = links::recognize(text) {
            info!("link from {sender_key}: {url}");
            self.send_typing(&incoming).await;
            self.send_text(&incoming, "Looking that up...").await;

            match self.tracker.on_link(&sender_key, &url).await {
                Ok(offers) => {
                    self.send_text(&incoming, &format_offer_list(&offers)).await;
                }
                Err(e) => {
                    warn!("probe failed for {url}: {e}");
                    self.send_text(&incoming, &format_extract_error(&e)).await;
                }
            }
            return;
        }

        match self.tracker.on_choice(&sender_key, text).await {
            Ok(chosen) => self.deliver(&incoming, chosen).await,
            Err(ChoiceError::NotAChoice) | Err(ChoiceError::NoPending) => {
                debug!("ignoring message from {sender_key}");
            }
            Err(ChoiceError::OutOfRange { given, max }) => {
                self.send_text(
                    &incoming,
                    &format!(
                        "{given} is not one of the offered options (1-{max}). \
                         Send the link again to start over."
                    ),
                )
                .await;
            }
        }
    }

    /// Download the chosen variant and send it back as a video attachment.
    async fn deliver(&self, incoming: &IncomingMessage, chosen: ChosenOffer) {
        self.send_text(
            incoming,
            &format!("Downloading *{}* in {}...", chosen.title, chosen.offer.label),
        )
        .await;
        self.send_typing(incoming).await;

        let downloads_dir =
            PathBuf::from(reelbot_core::config::shellexpand(&self.data_dir)).join("downloads");
        if let Err(e) = tokio::fs::create_dir_all(&downloads_dir).await {
            error!("cannot create {}: {e}", downloads_dir.display());
            self.send_text(incoming, "Download failed. Try again later.")
                .await;
            return;
        }

        let dest = downloads_dir.join(format!("{}.mp4", Uuid::new_v4()));
        match self
            .downloader
            .fetch(&chosen.url, &chosen.offer.format_id, &dest)
            .await
        {
            Ok(path) => {
                self.send_file(incoming, &chosen, &path).await;
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!("failed to remove {}: {e}", path.display());
                }
            }
            Err(e) => {
                error!("download failed for {}: {e}", chosen.url);
                self.send_text(incoming, "Download failed. Try again later.")
                    .await;
                // A partial file may be left behind on timeout.
                let _ = tokio::fs::remove_file(&dest).await;
            }
        }
    }

    /// Read the downloaded file and push it through the channel.
    async fn send_file(&self, incoming: &IncomingMessage, chosen: &ChosenOffer, path: &PathBuf) {
        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) => {
                error!("cannot read {}: {e}", path.display());
                self.send_text(incoming, "Download failed. Try again later.")
                    .await;
                return;
            }
        };

        let target = match incoming.reply_target.as_deref() {
            Some(t) => t,
            None => {
                error!("no reply target for {}", incoming.sender_id);
                return;
            }
        };

        let caption = format!("{}\n{}", chosen.title, chosen.offer.label);
        if let Some(channel) = self.channels.get(&incoming.channel) {
            if let Err(e) = channel.send_video(target, &bytes, &caption).await {
                error!("video delivery failed: {e}");
                self.send_text(incoming, "Couldn't send the video. Try again later.")
                    .await;
            } else {
                info!(
                    "delivered '{}' ({}, {} bytes) to {}",
                    chosen.title,
                    chosen.offer.label,
                    bytes.len(),
                    incoming.sender_id
                );
            }
        }
    }

    /// Best-effort typing indicator.
    async fn send_typing(&self, incoming: &IncomingMessage) {
        if let (Some(channel), Some(target)) = (
            self.channels.get(&incoming.channel),
            incoming.reply_target.as_deref(),
        ) {
            if let Err(e) = channel.send_typing(target).await {
                debug!("send_typing failed: {e}");
            }
        }
    }
}

/// Render the numbered quality menu for a probed video.
fn format_offer_list(offers: &OfferList) -> String {
    let mut out = format!("*{}*\n\nChoose a quality:\n", offers.title);
    for (i, offer) in offers.offers.iter().enumerate() {
        out.push_str(&format!("{}. {} {}\n", i + 1, offer.label, offer.size_display()));
    }
    out.push_str("\nReply with a number.");
    out
}

/// Turn an extraction failure into something the sender can act on.
fn format_extract_error(err: &ExtractError) -> String {
    match err {
        ExtractError::DurationExceeded { actual_secs, limit_secs } => format!(
            "That video is {} long. Only videos up to {} minutes are supported.",
            format_duration(*actual_secs),
            limit_secs / 60
        ),
        ExtractError::NoFormats => {
            "No downloadable quality found for that video.".to_string()
        }
        ExtractError::Unavailable(_) => {
            "That video is unavailable. It may be private or removed.".to_string()
        }
        ExtractError::Restricted(_) => {
            "That video can't be downloaded here (restricted content).".to_string()
        }
        ExtractError::Unknown(_) => {
            "Couldn't read that video. Check the link and try again.".to_string()
        }
    }
}

fn format_duration(secs: u64) -> String {
    let mins = secs / 60;
    let rem = secs % 60;
    if rem == 0 {
        format!("{mins}m")
    } else {
        format!("{mins}m{rem:02}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reelbot_core::config::ApiConfig;
    use reelbot_core::error::ReelError;
    use reelbot_core::media::{MediaFormat, QualityOffer, VideoMeta};
    use reelbot_core::message::OutgoingMessage;
    use reelbot_core::negotiation::{NegotiationTracker, SelectionLimits};
    use reelbot_core::traits::{Channel, Downloader, Extractor};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    // -----------------------------------------------------------------------
    // Mocks
    // -----------------------------------------------------------------------

    #[derive(Default)]
    struct Captured {
        texts: Vec<String>,
        videos: Vec<(String, usize, String)>,
    }

    /// Channel that records everything sent through it.
    struct MockChannel {
        captured: Arc<Mutex<Captured>>,
    }

    #[async_trait]
    impl Channel for MockChannel {
        fn name(&self) -> &str {
            "mock"
        }

        async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, ReelError> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }

        async fn send(&self, message: OutgoingMessage) -> Result<(), ReelError> {
            self.captured.lock().unwrap().texts.push(message.text);
            Ok(())
        }

        async fn send_video(
            &self,
            target: &str,
            video: &[u8],
            caption: &str,
        ) -> Result<(), ReelError> {
            self.captured.lock().unwrap().videos.push((
                target.to_string(),
                video.len(),
                caption.to_string(),
            ));
            Ok(())
        }

        async fn stop(&self) -> Result<(), ReelError> {
            Ok(())
        }
    }

    struct FakeExtractor(VideoMeta);

    #[async_trait]
    impl Extractor for FakeExtractor {
        async fn probe(&self, _url: &str) -> Result<VideoMeta, ExtractError> {
            Ok(self.0.clone())
        }
    }

    /// Downloader that writes a small file to the destination.
    struct FakeDownloader;

    #[async_trait]
    impl Downloader for FakeDownloader {
        async fn fetch(
            &self,
            _url: &str,
            _format_id: &str,
            dest: &Path,
        ) -> Result<PathBuf, ReelError> {
            tokio::fs::write(dest, b"fake mp4 bytes").await?;
            Ok(dest.to_path_buf())
        }
    }

    fn test_meta() -> VideoMeta {
        VideoMeta {
            title: "Test Video".to_string(),
            duration_secs: 120,
            formats: vec![
                MediaFormat {
                    format_id: "18".to_string(),
                    height: Some(360),
                    vcodec: Some("avc1".to_string()),
                    acodec: Some("mp4a".to_string()),
                    filesize: Some(1_000_000),
                    format_note: None,
                },
                MediaFormat {
                    format_id: "22".to_string(),
                    height: Some(720),
                    vcodec: Some("avc1".to_string()),
                    acodec: Some("mp4a".to_string()),
                    filesize: None,
                    format_note: None,
                },
            ],
        }
    }

    fn test_gateway(meta: VideoMeta) -> (Arc<Gateway>, Arc<Mutex<Captured>>) {
        let captured = Arc::new(Mutex::new(Captured::default()));
        let channel = MockChannel {
            captured: captured.clone(),
        };
        let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
        channels.insert("mock".to_string(), Arc::new(channel));

        let tracker = NegotiationTracker::new(
            Arc::new(FakeExtractor(meta)),
            SelectionLimits {
                max_duration_secs: 600,
                standard_height: 360,
                high_height: 720,
            },
        );

        let data_dir = std::env::temp_dir()
            .join(format!("reelbot-test-{}", Uuid::new_v4()))
            .to_string_lossy()
            .to_string();

        let gw = Gateway::new(
            channels,
            tracker,
            Arc::new(FakeDownloader),
            ApiConfig::default(),
            data_dir,
        );
        (Arc::new(gw), captured)
    }

    fn incoming(text: &str) -> IncomingMessage {
        IncomingMessage {
            id: Uuid::new_v4(),
            channel: "mock".to_string(),
            sender_id: "42".to_string(),
            sender_name: Some("tester".to_string()),
            text: text.to_string(),
            timestamp: chrono::Utc::now(),
            reply_target: Some("42".to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Pipeline flow
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_help_command_replies_with_usage() {
        let (gw, captured) = test_gateway(test_meta());
        gw.handle_message(incoming("/help")).await;

        let texts = &captured.lock().unwrap().texts;
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("YouTube link"));
    }

    #[tokio::test]
    async fn test_link_produces_offer_menu() {
        let (gw, captured) = test_gateway(test_meta());
        gw.handle_message(incoming("https://youtu.be/dQw4w9WgXcQ"))
            .await;

        let texts = captured.lock().unwrap().texts.clone();
        assert_eq!(texts.len(), 2, "status text then offer menu");
        assert!(texts[0].contains("Looking that up"));
        assert!(texts[1].contains("Test Video"));
        assert!(texts[1].contains("1. 360p"));
        assert!(texts[1].contains("2. 720p"));
    }

    #[tokio::test]
    async fn test_full_link_then_choice_delivers_video() {
        let (gw, captured) = test_gateway(test_meta());
        gw.handle_message(incoming("check this https://youtu.be/dQw4w9WgXcQ"))
            .await;
        gw.handle_message(incoming("2")).await;

        let cap = captured.lock().unwrap();
        assert_eq!(cap.videos.len(), 1, "one video delivered");
        let (target, size, caption) = &cap.videos[0];
        assert_eq!(target, "42");
        assert!(*size > 0);
        assert_eq!(caption, "Test Video\n720p");
    }

    #[tokio::test]
    async fn test_out_of_range_choice_gets_terminal_reply() {
        let (gw, captured) = test_gateway(test_meta());
        gw.handle_message(incoming("https://youtu.be/dQw4w9WgXcQ"))
            .await;
        gw.handle_message(incoming("9")).await;

        let cap = captured.lock().unwrap();
        assert!(cap.videos.is_empty());
        let last = cap.texts.last().unwrap();
        assert!(last.contains("9 is not one of the offered options"));
        assert!(last.contains("1-2"));
    }

    #[tokio::test]
    async fn test_ordinary_text_is_silent() {
        let (gw, captured) = test_gateway(test_meta());
        gw.handle_message(incoming("hello there")).await;
        assert!(captured.lock().unwrap().texts.is_empty());
    }

    #[tokio::test]
    async fn test_numeric_without_pending_is_silent() {
        let (gw, captured) = test_gateway(test_meta());
        gw.handle_message(incoming("1")).await;
        assert!(captured.lock().unwrap().texts.is_empty());
    }

    #[tokio::test]
    async fn test_too_long_video_is_reported() {
        let mut meta = test_meta();
        meta.duration_secs = 698;
        let (gw, captured) = test_gateway(meta);
        gw.handle_message(incoming("https://youtu.be/dQw4w9WgXcQ"))
            .await;

        let texts = captured.lock().unwrap().texts.clone();
        let last = texts.last().unwrap();
        assert!(last.contains("11m38s"));
        assert!(last.contains("10 minutes"));
    }

    // -----------------------------------------------------------------------
    // Formatting
    // -----------------------------------------------------------------------

    #[test]
    fn test_format_offer_list() {
        let offers = OfferList {
            title: "A Video".to_string(),
            offers: vec![
                QualityOffer {
                    label: "360p".to_string(),
                    format_id: "18".to_string(),
                    height: 360,
                    filesize: Some(12_582_912),
                },
                QualityOffer {
                    label: "720p".to_string(),
                    format_id: "22".to_string(),
                    height: 720,
                    filesize: None,
                },
            ],
        };
        let text = format_offer_list(&offers);
        assert!(text.contains("*A Video*"));
        assert!(text.contains("1. 360p (12.00 MB)"));
        assert!(text.contains("2. 720p (size unknown)"));
        assert!(text.contains("Reply with a number."));
    }

    #[test]
    fn test_format_extract_errors_are_user_safe() {
        // Raw stderr payloads never leak into the reply.
        let err = ExtractError::Unknown("ERROR: traceback garbage".to_string());
        assert!(!format_extract_error(&err).contains("traceback"));

        let err = ExtractError::Restricted("HTTP Error 403".to_string());
        assert!(!format_extract_error(&err).contains("403"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(600), "10m");
        assert_eq!(format_duration(698), "11m38s");
        assert_eq!(format_duration(61), "1m01s");
    }
}
