//! Collaborator-reported video metadata and the offer types derived from it.

use serde::{Deserialize, Serialize};

/// Metadata the extraction collaborator reports for a source URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMeta {
    pub title: String,
    pub duration_secs: u64,
    pub formats: Vec<MediaFormat>,
}

/// One retrievable rendition as the extractor describes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFormat {
    /// Opaque token understood by the fetch collaborator.
    pub format_id: String,
    /// Vertical resolution, when known.
    pub height: Option<u32>,
    /// Video codec marker; "none" means audio-only.
    pub vcodec: Option<String>,
    /// Audio codec marker; "none" means video-only.
    pub acodec: Option<String>,
    pub filesize: Option<u64>,
    /// Free-text note from the extractor (carries DRM markers).
    pub format_note: Option<String>,
}

impl MediaFormat {
    /// Whether this rendition carries both a picture and a sound track at a
    /// known vertical resolution, without a DRM marker.
    pub fn is_downloadable(&self) -> bool {
        let has_video = matches!(self.vcodec.as_deref(), Some(v) if v != "none");
        let has_audio = matches!(self.acodec.as_deref(), Some(a) if a != "none");
        let drm = self
            .format_note
            .as_deref()
            .is_some_and(|n| n.contains("DRM"));
        has_video && has_audio && self.height.is_some() && !drm
    }
}

/// One offered quality variant, as shown to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityOffer {
    /// Display label (e.g. "360p").
    pub label: String,
    /// Fetch token for the download collaborator.
    pub format_id: String,
    pub height: u32,
    /// Size estimate in bytes, when the extractor reports one.
    pub filesize: Option<u64>,
}

impl QualityOffer {
    /// Human-readable size, e.g. "(12.34 MB)" or "(size unknown)".
    pub fn size_display(&self) -> String {
        match self.filesize {
            Some(bytes) => format!("({:.2} MB)", bytes as f64 / (1024.0 * 1024.0)),
            None => "(size unknown)".to_string(),
        }
    }
}
