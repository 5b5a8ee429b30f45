use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// UserStats
// ---------------------------------------------------------------------------

/// Gamification counters. Mutated only by the progress engine
/// (`crate::progress`); every field starts at zero for a fresh profile.
///
/// Invariant: `best_streak >= current_streak` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub last_active_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_milestones: u32,
    #[serde(default)]
    pub xp: u32,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            current_streak: 0,
            best_streak: 0,
            last_active_date: None,
            total_milestones: 0,
            xp: 0,
        }
    }
}

impl UserStats {
    /// Derived level for the current XP total. Delegates to the single
    /// shared formula in `crate::progress`.
    pub fn level(&self) -> u32 {
        crate::progress::compute_level(self.xp)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_zero() {
        let s = UserStats::default();
        assert_eq!(s.current_streak, 0);
        assert_eq!(s.best_streak, 0);
        assert_eq!(s.last_active_date, None);
        assert_eq!(s.xp, 0);
        assert_eq!(s.level(), 1);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let s: UserStats = serde_json::from_str("{}").unwrap();
        assert_eq!(s, UserStats::default());
    }
}
