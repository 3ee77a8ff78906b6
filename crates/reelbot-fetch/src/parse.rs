//! Deserialization of `yt-dlp -J` metadata dumps.

use reelbot_core::error::ExtractError;
use reelbot_core::media::{MediaFormat, VideoMeta};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(default)]
    title: Option<String>,
    /// yt-dlp reports fractional seconds for some extractors.
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: String,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    acodec: Option<String>,
    #[serde(default)]
    filesize: Option<u64>,
    #[serde(default)]
    filesize_approx: Option<f64>,
    #[serde(default)]
    format_note: Option<String>,
}

/// Parse the JSON dump from `yt-dlp -J` into channel-agnostic metadata.
pub(crate) fn parse_video_meta(json: &str) -> Result<VideoMeta, ExtractError> {
    let info: RawInfo = serde_json::from_str(json)
        .map_err(|e| ExtractError::Unknown(format!("unparseable metadata: {e}")))?;

    let formats = info
        .formats
        .into_iter()
        .map(|f| MediaFormat {
            format_id: f.format_id,
            height: f.height,
            vcodec: f.vcodec,
            acodec: f.acodec,
            filesize: f.filesize.or(f.filesize_approx.map(|s| s as u64)),
            format_note: f.format_note,
        })
        .collect();

    Ok(VideoMeta {
        title: info.title.unwrap_or_else(|| "Untitled".to_string()),
        duration_secs: info.duration.unwrap_or(0.0).round() as u64,
        formats,
    })
}
