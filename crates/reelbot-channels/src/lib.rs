//! Messaging platform integrations.
//!
//! Each platform implements the [`Channel`](reelbot_core::traits::Channel)
//! trait from `reelbot-core` and delivers incoming messages over an mpsc
//! channel.

pub mod telegram;
pub mod utils;

pub use telegram::TelegramChannel;
