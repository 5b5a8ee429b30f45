use chrono::Utc;

use crate::pilar::Pilar;
use crate::stats::UserStats;

/// XP awarded per recorded streak tick.
pub const XP_PER_TICK: u32 = 100;

/// XP span of a single level.
pub const XP_PER_LEVEL: u32 = 1000;

// ---------------------------------------------------------------------------
// Pure functions
// ---------------------------------------------------------------------------

/// The single level formula. Every display surface (header, stats panel,
/// level-up watcher, mentor context) must go through this function —
/// divergent rounding between surfaces is a correctness bug.
pub fn compute_level(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// Record one activity tick: streak +1, best streak raised to match if
/// needed, last-active stamped, fixed XP reward added.
///
/// No streak-break logic lives here. The source system never decrements
/// `current_streak` on missed days; if a break rule exists it is
/// server-side and out of this crate's scope.
pub fn record_streak_tick(stats: &UserStats) -> UserStats {
    let current = stats.current_streak + 1;
    UserStats {
        current_streak: current,
        best_streak: stats.best_streak.max(current),
        last_active_date: Some(Utc::now()),
        total_milestones: stats.total_milestones,
        xp: stats.xp + XP_PER_TICK,
    }
}

/// Mark pilar `id` completed and unlock its successor, if any. All other
/// pilares are untouched. Idempotent: completing an already-completed
/// pilar changes nothing further.
pub fn complete_pilar(pilares: &mut [Pilar], id: u32) {
    for p in pilares.iter_mut() {
        if p.id == id {
            p.completado = true;
        } else if p.id == id + 1 {
            p.bloqueado = false;
        }
    }
}

// ---------------------------------------------------------------------------
// LevelWatcher
// ---------------------------------------------------------------------------

/// One-shot level-up event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
}

/// Stateful watcher that fires exactly once per upward level-threshold
/// crossing, however large the XP jump. Feed it every XP change; it
/// remembers the last observed level so repeated observations at the same
/// level stay silent.
#[derive(Debug, Clone)]
pub struct LevelWatcher {
    prev_level: u32,
}

impl LevelWatcher {
    pub fn new(xp: u32) -> Self {
        Self {
            prev_level: compute_level(xp),
        }
    }

    /// Observe the current XP total. Returns the crossing event when the
    /// derived level rose since the previous observation.
    pub fn observe(&mut self, xp: u32) -> Option<LevelUp> {
        let level = compute_level(xp);
        if level > self.prev_level {
            let event = LevelUp {
                from: self.prev_level,
                to: level,
            };
            self.prev_level = level;
            Some(event)
        } else {
            // Downward moves (state reset) re-baseline without firing.
            self.prev_level = level;
            None
        }
    }
}

impl Default for LevelWatcher {
    fn default() -> Self {
        Self::new(0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
