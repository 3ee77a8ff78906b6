//! Maps yt-dlp stderr output onto structured extraction errors.

use reelbot_core::error::ExtractError;

/// Classify a failed yt-dlp invocation by its stderr content.
///
/// The raw (trimmed) stderr travels with the variant so logs keep the full
/// story while callers decide what the sender gets to see.
pub(crate) fn classify_stderr(stderr: &str) -> ExtractError {
    let trimmed = stderr.trim();
    let lower = trimmed.to_lowercase();

    if lower.contains("sign in to confirm you're not a bot")
        || lower.contains("sign in to confirm your age")
        || lower.contains("age-restricted")
        || lower.contains("cookies are no longer valid")
        || lower.contains("use --cookies")
        || lower.contains("http error 403")
        || lower.contains("drm")
    {
        return ExtractError::Restricted(trimmed.to_string());
    }

    if lower.contains("private video")
        || lower.contains("video unavailable")
        || lower.contains("video is not available")
        || lower.contains("this video is not available")
        || lower.contains("video has been removed")
        || lower.contains("this video does not exist")
        || lower.contains("is not a valid url")
        || lower.contains("unsupported url")
    {
        return ExtractError::Unavailable(trimmed.to_string());
    }

    ExtractError::Unknown(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_private_video() {
        let err = classify_stderr(
            "ERROR: [youtube] abc123: Private video. Sign in if you've been granted access",
        );
        assert!(matches!(err, ExtractError::Unavailable(_)));
    }

    #[test]
    fn test_classify_removed_video() {
        let err = classify_stderr("ERROR: [youtube] abc123: Video unavailable");
        assert!(matches!(err, ExtractError::Unavailable(_)));
    }

    #[test]
    fn test_classify_bot_check() {
        let err = classify_stderr(
            "ERROR: [youtube] dQw4w9WgXcQ: Sign in to confirm you're not a bot. \
             Use --cookies-from-browser",
        );
        assert!(matches!(err, ExtractError::Restricted(_)));
    }

    #[test]
    fn test_classify_forbidden() {
        let err = classify_stderr("ERROR: unable to download video data: HTTP Error 403: Forbidden");
        assert!(matches!(err, ExtractError::Restricted(_)));
    }

    #[test]
    fn test_classify_case_insensitive() {
        let err = classify_stderr("ERROR: PRIVATE VIDEO");
        assert!(matches!(err, ExtractError::Unavailable(_)));
    }

    #[test]
    fn test_classify_unknown_keeps_raw_text() {
        let err = classify_stderr("  something exploded  ");
        match err {
            ExtractError::Unknown(raw) => assert_eq!(raw, "something exploded"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
