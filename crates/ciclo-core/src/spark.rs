use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DailySpark
// ---------------------------------------------------------------------------

/// Daily quote/action feed entry published by the backend. Read-only in
/// this core; completion is tracked per entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySpark {
    pub day_id: u32,
    pub quote: String,
    #[serde(default)]
    pub author: Option<String>,
    pub action_task: String,
    #[serde(default)]
    pub is_completed: bool,
}

// ---------------------------------------------------------------------------
// InteractionLog
// ---------------------------------------------------------------------------

/// Lightweight activity row, appended fire-and-forget and fetched for the
/// stats view (last 7 days).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionLog {
    pub created_at: DateTime<Utc>,
    pub action_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spark_optional_author_defaults() {
        let json = r#"{"day_id":1,"quote":"q","action_task":"a"}"#;
        let s: DailySpark = serde_json::from_str(json).unwrap();
        assert_eq!(s.author, None);
        assert!(!s.is_completed);
    }

    #[test]
    fn interaction_roundtrip() {
        let log = InteractionLog {
            created_at: Utc::now(),
            action_type: "pilar_completed".into(),
        };
        let json = serde_json::to_string(&log).unwrap();
        let parsed: InteractionLog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.action_type, "pilar_completed");
    }
}
