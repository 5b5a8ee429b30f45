use chrono::NaiveDate;

use ciclo_core::confession::Confession;
use ciclo_core::error::{CicloError, Result};
use ciclo_core::gating::{GatingInput, OnboardingStep};
use ciclo_core::goal::{Goal, GoalId};
use ciclo_core::identity::Identity;
use ciclo_core::pilar::{self, Pilar};
use ciclo_core::progress::{self, LevelUp, LevelWatcher};
use ciclo_core::spark::{DailySpark, InteractionLog};
use ciclo_core::stats::UserStats;
use ciclo_core::types::{ConfessionKind, Section};
use ciclo_sync::gateway::{ProfilePatch, UserData};

use crate::queue::SaveOp;

// ---------------------------------------------------------------------------
// OnboardingData
// ---------------------------------------------------------------------------

/// Census fields collected by the end of the onboarding sequence.
#[derive(Debug, Clone, Default)]
pub struct OnboardingData {
    pub name: String,
    pub dob: String,
    pub profession: String,
    pub email: Option<String>,
    pub device_id: Option<String>,
    pub blocker_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// User intents emitted by the presentation layer. Each is applied to
/// local state synchronously; any resulting persistence is returned as
/// save ops for the queue.
#[derive(Debug, Clone)]
pub enum Intent {
    ChooseStart,
    ChooseAuth,
    EnterGuest { device_id: String },
    AdvanceOnboarding,
    CompleteOnboarding(OnboardingData),
    MarkVerified,
    SetSection(Section),
    EnterBunker,
    ExitBunker,
    CompletePilar { id: u32 },
    EditIdentity(Identity),
    EditGoal {
        id: GoalId,
        title: String,
        target_date: Option<NaiveDate>,
    },
    AddSubTask { goal: GoalId, task_name: String },
    ToggleSubTask { goal: GoalId, index: usize },
    DeleteSubTask { goal: GoalId, index: usize },
    AddConfession {
        content: String,
        kind: ConfessionKind,
        pilar_id: u32,
        session_name: Option<String>,
        note: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// In-memory mirror of the user's entities plus ephemeral UI flags.
///
/// This is the source of truth for the active session: remote data is
/// merged in once per login, every mutation lands here first, and saves
/// trail behind best-effort. A transition to "no session" resets the
/// whole struct to its seeded defaults.
#[derive(Debug)]
pub struct AppState {
    pub identity: Identity,
    pub stats: UserStats,
    pub goals: Vec<Goal>,
    pub confessions: Vec<Confession>,
    pub pilares: Vec<Pilar>,
    pub sparks: Vec<DailySpark>,
    pub interactions: Vec<InteractionLog>,
    pub is_onboarded: bool,
    pub chosen_start: bool,
    pub chosen_auth: bool,
    pub bunker_active: bool,
    pub onboarding_step: OnboardingStep,
    pub section: Section,
    level_watcher: LevelWatcher,
    pending_level_up: Option<LevelUp>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            stats: UserStats::default(),
            goals: Goal::seed(),
            confessions: Vec::new(),
            pilares: Pilar::seed(),
            sparks: Vec::new(),
            interactions: Vec::new(),
            is_onboarded: false,
            chosen_start: false,
            chosen_auth: false,
            bunker_active: false,
            onboarding_step: OnboardingStep::Contract,
            section: Section::Home,
            level_watcher: LevelWatcher::default(),
            pending_level_up: None,
        }
    }
}

impl AppState {
    /// Tear down to the documented defaults. Called on every transition
    /// to "no session" — stale data must never survive a logout.
    pub fn reset(&mut self) {
        *self = AppState::default();
    }

    /// Merge one aggregate load over the seeded defaults. Empty results
    /// leave the seeds in place — partial availability is not an error.
    pub fn apply_remote(&mut self, data: UserData) {
        if let Some(profile) = data.profile {
            let (identity, stats) = profile.split();
            self.is_onboarded = identity.implies_onboarded();
            self.identity = identity;
            self.stats = stats;
            if self.is_onboarded {
                self.onboarding_step = OnboardingStep::Completed;
            }
            // Re-baseline so a loaded XP total does not fire a level-up.
            self.level_watcher = LevelWatcher::new(self.stats.xp);
        }
        if !data.goals.is_empty() {
            self.goals = data.goals;
        }
        if !data.confessions.is_empty() {
            self.confessions = data.confessions;
        }
        self.pilares = pilar::merge(
            std::mem::take(&mut self.pilares),
            &data.pillars,
            &data.pillar_progress,
        );
        if !data.sparks.is_empty() {
            self.sparks = data.sparks;
        }
        self.interactions = data.interactions;
    }

    /// One-shot level-up event, if a threshold was crossed since the
    /// last take. The shell consumes this to fire its celebration once.
    pub fn take_level_up(&mut self) -> Option<LevelUp> {
        self.pending_level_up.take()
    }

    /// Gating flags for this state, given what the session manager knows.
    pub fn gating_input(&self, session_resolved: bool, has_session: bool) -> GatingInput {
        GatingInput {
            session_resolved,
            has_session,
            chosen_start: self.chosen_start,
            chosen_auth: self.chosen_auth,
            guest: self.identity.is_guest(),
            is_onboarded: self.is_onboarded,
            is_verified: self.identity.is_verified,
            bunker_active: self.bunker_active,
            onboarding_step: self.onboarding_step,
            section: self.section,
        }
    }

    /// Apply one intent synchronously and return the saves it produced.
    /// The caller enqueues them; the UI never waits on the network.
    pub fn apply(&mut self, intent: Intent) -> Result<Vec<SaveOp>> {
        match intent {
            Intent::ChooseStart => {
                self.chosen_start = true;
                Ok(vec![])
            }
            Intent::ChooseAuth => {
                self.chosen_auth = true;
                self.onboarding_step = OnboardingStep::Auth;
                Ok(vec![])
            }
            Intent::EnterGuest { device_id } => {
                self.identity.enter_guest(device_id);
                self.onboarding_step = OnboardingStep::Quiz;
                Ok(vec![])
            }
            Intent::AdvanceOnboarding => {
                self.onboarding_step = self.onboarding_step.next(self.identity.is_guest());
                Ok(vec![])
            }
            Intent::CompleteOnboarding(data) => {
                self.identity.name = Some(data.name);
                self.identity.dob = Some(data.dob);
                self.identity.profession = Some(data.profession);
                if data.email.is_some() {
                    self.identity.email = data.email;
                }
                if data.device_id.is_some() {
                    self.identity.device_id = data.device_id;
                }
                if data.blocker_reason.is_some() {
                    self.identity.blocker_reason = data.blocker_reason;
                }
                self.is_onboarded = true;
                self.onboarding_step = OnboardingStep::Completed;
                Ok(vec![SaveOp::Profile(ProfilePatch::from_identity(
                    &self.identity,
                ))])
            }
            Intent::MarkVerified => {
                self.identity.is_verified = true;
                Ok(vec![SaveOp::Profile(ProfilePatch::verified())])
            }
            Intent::SetSection(section) => {
                self.section = section;
                Ok(vec![])
            }
            Intent::EnterBunker => {
                self.bunker_active = true;
                Ok(vec![])
            }
            Intent::ExitBunker => {
                self.bunker_active = false;
                Ok(vec![])
            }
            Intent::CompletePilar { id } => self.complete_pilar(id),
            Intent::EditIdentity(identity) => {
                self.identity = identity;
                Ok(vec![SaveOp::Profile(ProfilePatch::from_identity(
                    &self.identity,
                ))])
            }
            Intent::EditGoal {
                id,
                title,
                target_date,
            } => {
                let goal = self.goal_mut(&id)?;
                goal.goal_title = title;
                goal.target_date = target_date;
                let saved = goal.clone();
                Ok(vec![SaveOp::Goal(saved)])
            }
            Intent::AddSubTask { goal, task_name } => {
                let g = self.goal_mut(&goal)?;
                g.add_sub_task(task_name);
                let saved = g.clone();
                Ok(vec![SaveOp::Goal(saved)])
            }
            Intent::ToggleSubTask { goal, index } => {
                let g = self.goal_mut(&goal)?;
                g.toggle_sub_task(index)?;
                let saved = g.clone();
                Ok(vec![SaveOp::Goal(saved)])
            }
            Intent::DeleteSubTask { goal, index } => {
                let g = self.goal_mut(&goal)?;
                g.delete_sub_task(index)?;
                let saved = g.clone();
                Ok(vec![SaveOp::Goal(saved)])
            }
            Intent::AddConfession {
                content,
                kind,
                pilar_id,
                session_name,
                note,
            } => {
                let confession = Confession::new(content, kind, pilar_id, session_name, note);
                // Newest first, matching the fetch order.
                self.confessions.insert(0, confession.clone());
                Ok(vec![
                    SaveOp::Confession(confession),
                    SaveOp::Interaction {
                        action_type: "confession_added".into(),
                    },
                ])
            }
        }
    }

    /// Completing a pilar unlocks its successor and records a streak
    /// tick: one optimistic local mutation, three trailing saves.
    fn complete_pilar(&mut self, id: u32) -> Result<Vec<SaveOp>> {
        progress::complete_pilar(&mut self.pilares, id);

        let mut ops = vec![SaveOp::PilarProgress {
            pilar_id: id,
            completed: true,
            unlocked: true,
        }];
        if self.pilares.iter().any(|p| p.id == id + 1) {
            ops.push(SaveOp::PilarProgress {
                pilar_id: id + 1,
                completed: false,
                unlocked: true,
            });
        }

        self.stats = progress::record_streak_tick(&self.stats);
        if let Some(event) = self.level_watcher.observe(self.stats.xp) {
            self.pending_level_up = Some(event);
        }
        ops.push(SaveOp::Profile(ProfilePatch::from_stats(&self.stats)));
        ops.push(SaveOp::Interaction {
            action_type: "pilar_completed".into(),
        });
        Ok(ops)
    }

    fn goal_mut(&mut self, id: &GoalId) -> Result<&mut Goal> {
        self.goals
            .iter_mut()
            .find(|g| &g.id == id)
            .ok_or_else(|| CicloError::GoalNotFound(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
