use serde::{Deserialize, Serialize};

use crate::types::Section;

// ---------------------------------------------------------------------------
// OnboardingStep
// ---------------------------------------------------------------------------

/// Ordered sub-states of the onboarding sequence. Each step's completion
/// is a precondition for the next; the sequence can be entered at any
/// step (a partially authenticated user resumes at Quiz, a "log in"
/// click from the landing enters at Auth).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Contract,
    Auth,
    Quiz,
    Profile,
    Completed,
}

impl OnboardingStep {
    /// The next step in the sequence. Guests skip authentication.
    pub fn next(self, guest: bool) -> OnboardingStep {
        match self {
            OnboardingStep::Contract if guest => OnboardingStep::Quiz,
            OnboardingStep::Contract => OnboardingStep::Auth,
            OnboardingStep::Auth => OnboardingStep::Quiz,
            OnboardingStep::Quiz => OnboardingStep::Profile,
            OnboardingStep::Profile | OnboardingStep::Completed => OnboardingStep::Completed,
        }
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// The resolved top-level screen. Exactly one is active at any time; the
/// presentation layer renders it and reports intents back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    /// Session existence not yet resolved — never route before this clears.
    Loading,
    /// No session, user has not chosen to start.
    AnonymousLanding,
    /// No session, chose to start, not yet chosen to authenticate.
    Offer,
    Onboarding { step: OnboardingStep },
    VerificationGate,
    /// Focus-lock modal; suppresses all other navigation while active.
    Bunker,
    Main { section: Section },
}

// ---------------------------------------------------------------------------
// GatingInput
// ---------------------------------------------------------------------------

/// Everything the gating decision depends on, already resolved to plain
/// booleans. Fetch failures never reach this type — loaders degrade to
/// defaults first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatingInput {
    /// False until the session lifecycle manager has emitted its first value.
    pub session_resolved: bool,
    pub has_session: bool,
    /// User pressed "start" on the landing page.
    pub chosen_start: bool,
    /// User chose to authenticate (from the landing or offer page).
    pub chosen_auth: bool,
    /// Guest mode active (identity carries the sentinel name).
    pub guest: bool,
    pub is_onboarded: bool,
    pub is_verified: bool,
    pub bunker_active: bool,
    pub onboarding_step: OnboardingStep,
    pub section: Section,
}

impl Default for GatingInput {
    fn default() -> Self {
        Self {
            session_resolved: false,
            has_session: false,
            chosen_start: false,
            chosen_auth: false,
            guest: false,
            is_onboarded: false,
            is_verified: false,
            bunker_active: false,
            onboarding_step: OnboardingStep::Contract,
            section: Section::Home,
        }
    }
}

// ---------------------------------------------------------------------------
// resolve_screen
// ---------------------------------------------------------------------------

/// Resolve the active screen from the gating flags. Evaluated in priority
/// order, first match wins:
///
/// 1. `Loading` while the session is unresolved
/// 2. `AnonymousLanding` with no session and no start/auth choice
/// 3. `Offer` with no session after choosing to start
/// 4. `Onboarding` once a session exists (or guest mode, or an explicit
///    auth choice) until onboarding completes
/// 5. `VerificationGate` for onboarded, unverified non-guests
/// 6. `Bunker` when the focus lock is active
/// 7. `Main` otherwise
pub fn resolve_screen(input: &GatingInput) -> Screen {
    if !input.session_resolved {
        return Screen::Loading;
    }
    if !input.has_session && !input.guest && !input.chosen_auth {
        if !input.chosen_start {
            return Screen::AnonymousLanding;
        }
        return Screen::Offer;
    }
    if !input.is_onboarded {
        return Screen::Onboarding {
            step: input.onboarding_step,
        };
    }
    if !input.is_verified && !input.guest {
        return Screen::VerificationGate;
    }
    if input.bunker_active {
        return Screen::Bunker;
    }
    Screen::Main {
        section: input.section,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
