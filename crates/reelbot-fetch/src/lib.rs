//! Media extraction and download collaborators.
//!
//! Wraps the external `yt-dlp` binary behind the `Extractor` and
//! `Downloader` traits from `reelbot-core`. All process I/O is async and
//! bounded by a configurable wall-clock timeout.

mod classify;
mod parse;
mod ytdlp;

pub use ytdlp::YtDlp;
