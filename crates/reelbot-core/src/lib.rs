//! # reelbot-core
//!
//! Core types, traits, configuration, error handling, and the download
//! negotiation tracker for the Reelbot media-retrieval bot.

pub mod config;
pub mod error;
pub mod links;
pub mod media;
pub mod message;
pub mod negotiation;
pub mod traits;
