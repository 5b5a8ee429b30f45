use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CicloError, Result};

// ---------------------------------------------------------------------------
// GoalId
// ---------------------------------------------------------------------------

/// Identifier for a goal, tagged by origin.
///
/// `Seed` goals are placeholders created locally before the backend has
/// ever seen them; saving one must insert a new row (the backend issues
/// the real id). `Remote` goals carry a backend-issued primary key and
/// upsert in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "origin", content = "id", rename_all = "snake_case")]
pub enum GoalId {
    Seed(u8),
    Remote(Uuid),
}

impl GoalId {
    pub fn is_persisted(&self) -> bool {
        matches!(self, GoalId::Remote(_))
    }
}

impl std::fmt::Display for GoalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalId::Seed(n) => write!(f, "seed-{n}"),
            GoalId::Remote(u) => write!(f, "{u}"),
        }
    }
}

// ---------------------------------------------------------------------------
// SubTask / Goal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTask {
    pub task_name: String,
    #[serde(default)]
    pub is_done: bool,
}

/// A user goal with ordered sub-tasks. `progress_percentage` is always
/// derived from the sub-task list — it is recomputed on every mutation
/// and never set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub goal_title: String,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
    #[serde(default)]
    pub progress_percentage: u8,
}

impl Goal {
    /// The three placeholder goals seeded for a fresh profile. Goals are
    /// edited in place, never deleted, so the set is stable.
    pub fn seed() -> Vec<Goal> {
        (1..=3)
            .map(|n| Goal {
                id: GoalId::Seed(n),
                goal_title: format!("Meta de Impacto {n}"),
                target_date: None,
                sub_tasks: Vec::new(),
                progress_percentage: 0,
            })
            .collect()
    }

    /// `round(100 * done / total)`, or 0 with no sub-tasks.
    pub fn recompute_progress(&mut self) {
        let total = self.sub_tasks.len();
        if total == 0 {
            self.progress_percentage = 0;
            return;
        }
        let done = self.sub_tasks.iter().filter(|t| t.is_done).count();
        self.progress_percentage =
            ((100.0 * done as f64 / total as f64).round()) as u8;
    }

    pub fn add_sub_task(&mut self, task_name: impl Into<String>) {
        self.sub_tasks.push(SubTask {
            task_name: task_name.into(),
            is_done: false,
        });
        self.recompute_progress();
    }

    pub fn toggle_sub_task(&mut self, index: usize) -> Result<()> {
        let task = self.sub_tasks.get_mut(index).ok_or_else(|| {
            CicloError::SubTaskOutOfRange {
                goal: self.id.to_string(),
                index,
            }
        })?;
        task.is_done = !task.is_done;
        self.recompute_progress();
        Ok(())
    }

    pub fn delete_sub_task(&mut self, index: usize) -> Result<()> {
        if index >= self.sub_tasks.len() {
            return Err(CicloError::SubTaskOutOfRange {
                goal: self.id.to_string(),
                index,
            });
        }
        self.sub_tasks.remove(index);
        self.recompute_progress();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn goal_with_tasks(done: usize, total: usize) -> Goal {
        let mut g = Goal::seed().remove(0);
        for i in 0..total {
            g.add_sub_task(format!("t{i}"));
        }
        for i in 0..done {
            g.toggle_sub_task(i).unwrap();
        }
        g
    }

    #[test]
    fn seed_has_three_empty_goals() {
        let goals = Goal::seed();
        assert_eq!(goals.len(), 3);
        assert!(goals.iter().all(|g| !g.id.is_persisted()));
        assert!(goals.iter().all(|g| g.progress_percentage == 0));
    }

    #[test]
    fn progress_two_of_four_is_fifty() {
        let g = goal_with_tasks(2, 4);
        assert_eq!(g.progress_percentage, 50);
    }

    #[test]
    fn progress_one_of_three_rounds_to_33() {
        let g = goal_with_tasks(1, 3);
        assert_eq!(g.progress_percentage, 33);
    }

    #[test]
    fn progress_two_of_three_rounds_to_67() {
        let g = goal_with_tasks(2, 3);
        assert_eq!(g.progress_percentage, 67);
    }

    #[test]
    fn progress_zero_tasks_is_zero() {
        let g = goal_with_tasks(0, 0);
        assert_eq!(g.progress_percentage, 0);
    }

    #[test]
    fn adding_task_recalculates() {
        let mut g = goal_with_tasks(1, 3);
        assert_eq!(g.progress_percentage, 33);
        g.add_sub_task("cuarta");
        assert_eq!(g.progress_percentage, 25);
    }

    #[test]
    fn deleting_last_task_resets_to_zero() {
        let mut g = goal_with_tasks(1, 1);
        assert_eq!(g.progress_percentage, 100);
        g.delete_sub_task(0).unwrap();
        assert_eq!(g.progress_percentage, 0);
    }

    #[test]
    fn toggle_out_of_range_errors() {
        let mut g = goal_with_tasks(0, 1);
        assert!(g.toggle_sub_task(5).is_err());
    }

    #[test]
    fn toggle_back_and_forth() {
        let mut g = goal_with_tasks(0, 2);
        g.toggle_sub_task(0).unwrap();
        assert_eq!(g.progress_percentage, 50);
        g.toggle_sub_task(0).unwrap();
        assert_eq!(g.progress_percentage, 0);
    }

    #[test]
    fn goal_id_display() {
        assert_eq!(GoalId::Seed(2).to_string(), "seed-2");
        let u = Uuid::new_v4();
        assert_eq!(GoalId::Remote(u).to_string(), u.to_string());
    }
}
