//! Recognition of video-sharing links in incoming text.

use regex::Regex;
use std::sync::OnceLock;

/// Matches youtube.com/watch?v=ID and youtu.be/ID shapes, with optional
/// scheme and optional www./m. subdomain. Capture 1 is the video id.
fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:https?://)?(?:(?:www|m)\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([\w-]+)")
            .expect("link pattern is valid")
    })
}

/// Extract the first recognized video link from `text` and canonicalize it.
///
/// Returns `None` when the text carries no recognizable link — the message
/// is then ordinary conversation.
pub fn recognize(text: &str) -> Option<String> {
    let caps = link_pattern().captures(text)?;
    let id = caps.get(1)?.as_str();
    Some(format!("https://www.youtube.com/watch?v={id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_full_url() {
        assert_eq!(
            recognize("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_recognize_short_url() {
        assert_eq!(
            recognize("check this out https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_recognize_without_scheme() {
        assert_eq!(
            recognize("youtube.com/watch?v=abc_-123").as_deref(),
            Some("https://www.youtube.com/watch?v=abc_-123")
        );
    }

    #[test]
    fn test_recognize_mobile_subdomain() {
        assert_eq!(
            recognize("https://m.youtube.com/watch?v=xyz789").as_deref(),
            Some("https://www.youtube.com/watch?v=xyz789")
        );
    }

    #[test]
    fn test_recognize_embedded_in_text() {
        let text = "have you seen https://youtu.be/abc123 yet?";
        assert_eq!(
            recognize(text).as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
    }

    #[test]
    fn test_recognize_ordinary_text() {
        assert!(recognize("hello there").is_none());
        assert!(recognize("https://vimeo.com/12345").is_none());
        assert!(recognize("").is_none());
    }
}
