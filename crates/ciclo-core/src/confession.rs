use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ConfessionKind;

// ---------------------------------------------------------------------------
// Confession
// ---------------------------------------------------------------------------

/// A journal entry. Append-only: created on submission, never edited or
/// deleted. `content` holds the text, or a base64-encoded media payload
/// for voice and video entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confession {
    pub id: Uuid,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: ConfessionKind,
    pub timestamp: String,
    /// Calendar day the entry belongs to, `YYYY-MM-DD`.
    pub date: String,
    pub pilar_id: u32,
    #[serde(default)]
    pub session_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Confession {
    /// Build a new entry stamped with the current instant.
    pub fn new(
        content: impl Into<String>,
        kind: ConfessionKind,
        pilar_id: u32,
        session_name: Option<String>,
        note: Option<String>,
    ) -> Self {
        let now: DateTime<Utc> = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            kind,
            timestamp: now.format("%H:%M:%S").to_string(),
            date: now.format("%Y-%m-%d").to_string(),
            pilar_id,
            session_name,
            note,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stamps_date_and_time() {
        let c = Confession::new("texto", ConfessionKind::Text, 0, None, None);
        assert_eq!(c.date.len(), 10);
        assert_eq!(&c.date[4..5], "-");
        assert_eq!(c.timestamp.len(), 8);
    }

    #[test]
    fn kind_serializes_under_type_key() {
        let c = Confession::new("x", ConfessionKind::Voice, 2, None, Some("nota".into()));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "voice");
        assert_eq!(json["pilar_id"], 2);
        assert_eq!(json["note"], "nota");
    }

    #[test]
    fn ids_are_unique() {
        let a = Confession::new("a", ConfessionKind::Text, 0, None, None);
        let b = Confession::new("b", ConfessionKind::Text, 0, None, None);
        assert_ne!(a.id, b.id);
    }
}
