//! yt-dlp process wrapper implementing the extraction and download traits.

use crate::classify::classify_stderr;
use crate::parse::parse_video_meta;
use async_trait::async_trait;
use reelbot_core::config::DownloadConfig;
use reelbot_core::error::{ExtractError, ReelError};
use reelbot_core::media::VideoMeta;
use reelbot_core::traits::{Downloader, Extractor};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Shells out to the `yt-dlp` binary for metadata probes and downloads.
pub struct YtDlp {
    bin: String,
    timeout: Duration,
}

impl YtDlp {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            bin: config.ytdlp_bin.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Run the binary with the given args, killing it if the deadline passes.
    async fn run(&self, args: &[&str]) -> Result<Output, ReelError> {
        debug!("running {} {}", self.bin, args.join(" "));
        let fut = Command::new(&self.bin)
            .args(args)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| {
                ReelError::Download(format!("failed to launch {}: {e}", self.bin))
            }),
            Err(_) => Err(ReelError::Download(format!(
                "{} timed out after {}s",
                self.bin,
                self.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn probe(&self, url: &str) -> Result<VideoMeta, ExtractError> {
        let output = self
            .run(&["-J", "--no-playlist", "--no-warnings", url])
            .await
            .map_err(|e| ExtractError::Unknown(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_stderr(&stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let meta = parse_video_meta(&stdout)?;
        info!(
            "probed '{}' ({}s, {} formats)",
            meta.title,
            meta.duration_secs,
            meta.formats.len()
        );
        Ok(meta)
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn fetch(&self, url: &str, format_id: &str, dest: &Path) -> Result<PathBuf, ReelError> {
        let dest_str = dest
            .to_str()
            .ok_or_else(|| ReelError::Download(format!("non-UTF-8 path: {}", dest.display())))?;

        let output = self
            .run(&[
                "-f",
                format_id,
                "--merge-output-format",
                "mp4",
                "-o",
                dest_str,
                "--no-playlist",
                "--no-warnings",
                url,
            ])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReelError::Download(stderr.trim().to_string()));
        }

        if !dest.exists() {
            return Err(ReelError::Download(format!(
                "download finished but {} is missing",
                dest.display()
            )));
        }

        info!("downloaded format {format_id} to {}", dest.display());
        Ok(dest.to_path_buf())
    }
}
