use thiserror::Error;

/// Top-level error type for Reelbot.
#[derive(Debug, Error)]
pub enum ReelError {
    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Error from the media fetch collaborator.
    #[error("download error: {0}")]
    Download(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures reported while recognizing a link and building the offer list.
///
/// A closed set of causes; the collaborator's original message rides along as
/// the variant payload so callers match on the variant, not on text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No variant carries both a video and an audio track at a known
    /// resolution.
    #[error("no downloadable formats with both video and audio")]
    NoFormats,

    /// The content is private, removed, or otherwise gone.
    #[error("content unavailable: {0}")]
    Unavailable(String),

    /// The content requires sign-in or age verification.
    #[error("age or sign-in restricted: {0}")]
    Restricted(String),

    /// The reported duration exceeds the configured ceiling.
    #[error("duration {actual_secs}s exceeds the {limit_secs}s ceiling")]
    DurationExceeded { actual_secs: u64, limit_secs: u64 },

    /// Anything the collaborator reported that fits no other variant.
    #[error("metadata extraction failed: {0}")]
    Unknown(String),
}

/// Failures reported while resolving a quality choice reply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChoiceError {
    /// The text does not parse as an integer — ordinary conversation, the
    /// pending selection (if any) is left untouched.
    #[error("not a quality choice")]
    NotAChoice,

    /// A numeric reply arrived with nothing pending for the sender.
    #[error("no pending selection for this sender")]
    NoPending,

    /// The index falls outside the offered list. The pending selection is
    /// cleared; the sender must resend the link.
    #[error("choice {given} is out of range 1..={max}")]
    OutOfRange { given: usize, max: usize },
}
