//! Tests for the Telegram channel module.

use super::types::*;
use crate::utils::split_message;

#[test]
fn test_split_short_message() {
    let chunks = split_message("hello", 4096);
    assert_eq!(chunks, vec!["hello"]);
}

#[test]
fn test_split_long_message() {
    let text = "a\n".repeat(3000);
    let chunks = split_message(&text, 4096);
    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.len() <= 4096);
    }
}

#[test]
fn test_split_message_multibyte() {
    // Each Cyrillic char is 2 bytes in UTF-8. 100 chars = 200 bytes.
    let text = "\u{0411}".repeat(100);
    assert_eq!(text.len(), 200);
    // max_len=151 lands inside a 2-byte char; the boundary must back off.
    let chunks = split_message(&text, 151);
    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(chunk.len() <= 151);
    }
    let reassembled: String = chunks.iter().copied().collect();
    assert_eq!(reassembled, text);
}

#[test]
fn test_split_message_emoji_boundary() {
    // Each emoji is 4 bytes. 50 emojis = 200 bytes.
    let text = "\u{1f30d}".repeat(50);
    assert_eq!(text.len(), 200);
    let chunks = split_message(&text, 10);
    assert!(!chunks.is_empty());
    let reassembled: String = chunks.iter().copied().collect();
    assert_eq!(reassembled, text);
}

#[test]
fn test_tg_chat_group_detection() {
    let group: TgChat = serde_json::from_str(r#"{"id": -100123, "type": "group"}"#).unwrap();
    assert_eq!(group.chat_type, "group");

    let supergroup: TgChat =
        serde_json::from_str(r#"{"id": -100456, "type": "supergroup"}"#).unwrap();
    assert_eq!(supergroup.chat_type, "supergroup");

    let private: TgChat = serde_json::from_str(r#"{"id": 789, "type": "private"}"#).unwrap();
    assert_eq!(private.chat_type, "private");

    // is_group check
    assert!(matches!(group.chat_type.as_str(), "group" | "supergroup"));
    assert!(!matches!(
        private.chat_type.as_str(),
        "group" | "supergroup"
    ));
}

#[test]
fn test_tg_chat_type_defaults_when_missing() {
    let chat: TgChat = serde_json::from_str(r#"{"id": 123}"#).unwrap();
    assert_eq!(chat.chat_type, "");
    // Missing type should not be detected as group.
    assert!(!matches!(chat.chat_type.as_str(), "group" | "supergroup"));
}

#[test]
fn test_tg_message_text_only() {
    let json = r#"{
        "message_id": 2,
        "chat": {"id": 100, "type": "private"},
        "text": "https://youtu.be/dQw4w9WgXcQ"
    }"#;
    let msg: TgMessage = serde_json::from_str(json).unwrap();
    assert_eq!(msg.text.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));
    assert!(msg.from.is_none());
}

#[test]
fn test_tg_update_without_message() {
    let update: TgUpdate = serde_json::from_str(r#"{"update_id": 7}"#).unwrap();
    assert_eq!(update.update_id, 7);
    assert!(update.message.is_none());
}

#[test]
fn test_tg_response_error_shape() {
    let resp: TgResponse<Vec<TgUpdate>> =
        serde_json::from_str(r#"{"ok": false, "description": "Unauthorized"}"#).unwrap();
    assert!(!resp.ok);
    assert!(resp.result.is_none());
    assert_eq!(resp.description.as_deref(), Some("Unauthorized"));
}
