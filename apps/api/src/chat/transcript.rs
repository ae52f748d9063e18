//! Conversation log export/import as a JSON array of `{role, content}`.

use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::conversation::ConversationEntry;

pub fn export_history(history: &[ConversationEntry]) -> Result<String, AppError> {
    serde_json::to_string(history)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize history: {e}")))
}

/// Parses an exported log. Roles other than `user` and `assistant` are rejected.
pub fn parse_history(raw: &[u8]) -> Result<Vec<ConversationEntry>, AppError> {
    serde_json::from_slice(raw).map_err(|e| AppError::ImportFormat(e.to_string()))
}

pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("valleyhelps_chat_{}.json", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_then_import_round_trips() {
        let history = vec![
            ConversationEntry::user("What's the vacation policy?"),
            ConversationEntry::assistant("Employees accrue \"15\" days.\nSee the MOU."),
            ConversationEntry::user("Thanks"),
        ];
        let exported = export_history(&history).unwrap();
        assert_eq!(parse_history(exported.as_bytes()).unwrap(), history);
    }

    #[test]
    fn test_export_shape() {
        let exported = export_history(&[ConversationEntry::user("hi")]).unwrap();
        assert_eq!(exported, r#"[{"role":"user","content":"hi"}]"#);
    }

    #[test]
    fn test_malformed_json_is_import_format_error() {
        for raw in [
            "not json",
            r#"{"role":"user","content":"hi"}"#,
            r#"[{"role":"system","content":"hi"}]"#,
            r#"[{"role":"user"}]"#,
            r#"[{"role":"user","content":"hi"}"#,
        ] {
            let err = parse_history(raw.as_bytes()).unwrap_err();
            assert!(matches!(err, AppError::ImportFormat(_)), "input: {raw}");
        }
    }

    #[test]
    fn test_invalid_utf8_is_import_format_error() {
        let err = parse_history(&[b'[', 0xff, 0xfe, b']']).unwrap_err();
        assert!(matches!(err, AppError::ImportFormat(_)));
    }

    #[test]
    fn test_empty_array_imports_as_empty_log() {
        assert!(parse_history(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_export_file_name_uses_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(export_file_name(now), "valleyhelps_chat_20250304_050607.json");
    }
}
