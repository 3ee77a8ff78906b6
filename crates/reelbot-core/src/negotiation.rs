//! Download Negotiation Tracker — the per-sender link/choice state machine.
//!
//! Associates a sender identity with at most one outstanding "link received,
//! awaiting quality selection" record, and resolves or discards that record
//! on the sender's next relevant message. The store is owned by the tracker
//! and lives for the hosting service's run; nothing is persisted.

use crate::config::DownloadConfig;
use crate::error::{ChoiceError, ExtractError};
use crate::media::{MediaFormat, QualityOffer, VideoMeta};
use crate::traits::Extractor;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Thresholds and ceilings applied when building an offer list.
#[derive(Debug, Clone, Copy)]
pub struct SelectionLimits {
    /// Sources longer than this are rejected before anything is stored.
    pub max_duration_secs: u64,
    /// Ceiling for the "standard" offer.
    pub standard_height: u32,
    /// Ceiling for the "high" offer.
    pub high_height: u32,
}

impl From<&DownloadConfig> for SelectionLimits {
    fn from(cfg: &DownloadConfig) -> Self {
        Self {
            max_duration_secs: cfg.max_duration_secs,
            standard_height: cfg.standard_height,
            high_height: cfg.high_height,
        }
    }
}

/// Offer list returned for display after a successful link recognition.
#[derive(Debug, Clone)]
pub struct OfferList {
    pub title: String,
    pub offers: Vec<QualityOffer>,
}

/// A resolved choice, ready for the media fetch collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ChosenOffer {
    pub url: String,
    pub title: String,
    pub offer: QualityOffer,
}

/// Stored record awaiting the sender's numeric reply.
#[derive(Debug, Clone)]
struct PendingSelection {
    url: String,
    title: String,
    offers: Vec<QualityOffer>,
}

/// Tracks one pending quality negotiation per sender identity.
pub struct NegotiationTracker {
    extractor: Arc<dyn Extractor>,
    limits: SelectionLimits,
    /// One mutex guards the whole map: check-then-act for a key never
    /// interleaves with another check-then-act on the same key.
    pending: Mutex<HashMap<String, PendingSelection>>,
}

impl NegotiationTracker {
    pub fn new(extractor: Arc<dyn Extractor>, limits: SelectionLimits) -> Self {
        Self {
            extractor,
            limits,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Handle a recognized link: probe the extractor, build the offer list,
    /// and store a pending selection for the sender.
    ///
    /// A new link replaces any previous pending selection wholesale. On any
    /// failure the sender's pending selection, if one existed, is cleared so
    /// the sender is never stuck.
    pub async fn on_link(&self, sender: &str, url: &str) -> Result<OfferList, ExtractError> {
        match self.probe_and_select(url).await {
            Ok((title, offers)) => {
                let record = PendingSelection {
                    url: url.to_string(),
                    title: title.clone(),
                    offers: offers.clone(),
                };
                self.pending.lock().await.insert(sender.to_string(), record);
                info!(
                    "offering {} variant(s) of '{}' to {}",
                    offers.len(),
                    title,
                    sender
                );
                Ok(OfferList { title, offers })
            }
            Err(e) => {
                self.pending.lock().await.remove(sender);
                Err(e)
            }
        }
    }

    /// Handle a possible quality choice reply.
    ///
    /// Text that does not parse as an integer is ordinary conversation and
    /// leaves any pending selection in place. A parsed integer consumes the
    /// pending selection whether it resolves or falls out of range — the
    /// record is single-use and the sender resends the link to start over.
    pub async fn on_choice(&self, sender: &str, raw_text: &str) -> Result<ChosenOffer, ChoiceError> {
        let index: usize = raw_text
            .trim()
            .parse()
            .map_err(|_| ChoiceError::NotAChoice)?;

        let mut pending = self.pending.lock().await;
        let selection = pending.remove(sender).ok_or(ChoiceError::NoPending)?;

        if index == 0 || index > selection.offers.len() {
            debug!(
                "choice {} from {} out of range (offers: {})",
                index,
                sender,
                selection.offers.len()
            );
            return Err(ChoiceError::OutOfRange {
                given: index,
                max: selection.offers.len(),
            });
        }

        Ok(ChosenOffer {
            url: selection.url,
            title: selection.title,
            offer: selection.offers[index - 1].clone(),
        })
    }

    /// Probe the extractor and apply the duration guard and variant
    /// selection. Never touches the pending map — the lock is only taken
    /// after collaborator I/O completes.
    async fn probe_and_select(&self, url: &str) -> Result<(String, Vec<QualityOffer>), ExtractError> {
        let meta = self.extractor.probe(url).await?;

        if meta.duration_secs > self.limits.max_duration_secs {
            return Err(ExtractError::DurationExceeded {
                actual_secs: meta.duration_secs,
                limit_secs: self.limits.max_duration_secs,
            });
        }

        let offers = select_offers(
            &meta.formats,
            self.limits.standard_height,
            self.limits.high_height,
        );
        if offers.is_empty() {
            return Err(ExtractError::NoFormats);
        }

        Ok((meta.title, offers))
    }
}

/// Pick at most two representative variants from the extractor's format list.
///
/// Qualifying variants (both tracks, known height, no DRM) are ordered by
/// descending resolution. The "standard" pick is the highest at or below
/// `standard_height`, falling back to the lowest available; the "high" pick
/// is the highest at or below `high_height`, falling back to the highest
/// available. Coinciding picks collapse to one offer.
pub fn select_offers(
    formats: &[MediaFormat],
    standard_height: u32,
    high_height: u32,
) -> Vec<QualityOffer> {
    let mut candidates: Vec<&MediaFormat> =
        formats.iter().filter(|f| f.is_downloadable()).collect();
    if candidates.is_empty() {
        return Vec::new();
    }
    candidates.sort_by(|a, b| b.height.cmp(&a.height));

    let standard = candidates
        .iter()
        .find(|f| f.height.unwrap_or(0) <= standard_height)
        .copied()
        .or_else(|| candidates.last().copied());
    let high = candidates
        .iter()
        .find(|f| f.height.unwrap_or(0) <= high_height)
        .copied()
        .or_else(|| candidates.first().copied());

    let mut offers: Vec<QualityOffer> = Vec::new();
    for format in [standard, high].into_iter().flatten() {
        let height = format.height.unwrap_or(0);
        let offer = QualityOffer {
            label: format!("{height}p"),
            format_id: format.format_id.clone(),
            height,
            filesize: format.filesize,
        };
        if !offers.iter().any(|o| o.format_id == offer.format_id) {
            offers.push(offer);
        }
    }
    offers
}
