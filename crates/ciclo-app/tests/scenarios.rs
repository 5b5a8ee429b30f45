//! End-to-end scenarios driven through intents and the gating decision,
//! without a backend: local state is the source of truth and every
//! transition here must hold regardless of network behaviour.

use ciclo_app::state::{AppState, Intent, OnboardingData};
use ciclo_core::gating::{resolve_screen, OnboardingStep, Screen};
use ciclo_core::types::{ConfessionKind, Section};

fn screen_of(state: &AppState, resolved: bool, has_session: bool) -> Screen {
    resolve_screen(&state.gating_input(resolved, has_session))
}

#[test]
fn new_user_signs_up_onboards_and_completes_first_pilar() {
    let mut state = AppState::default();

    // Before the session resolves nothing else may render.
    assert_eq!(screen_of(&state, false, false), Screen::Loading);
    assert_eq!(screen_of(&state, true, false), Screen::AnonymousLanding);

    state.apply(Intent::ChooseStart).unwrap();
    assert_eq!(screen_of(&state, true, false), Screen::Offer);

    state.apply(Intent::ChooseAuth).unwrap();
    assert_eq!(
        screen_of(&state, true, false),
        Screen::Onboarding {
            step: OnboardingStep::Auth
        }
    );

    // Authentication succeeded; the sequence resumes at the quiz.
    state.onboarding_step = OnboardingStep::Quiz;
    state.apply(Intent::AdvanceOnboarding).unwrap();
    assert_eq!(state.onboarding_step, OnboardingStep::Profile);

    state
        .apply(Intent::CompleteOnboarding(OnboardingData {
            name: "Ana".into(),
            dob: "1994-02-11".into(),
            profession: "diseñadora".into(),
            ..OnboardingData::default()
        }))
        .unwrap();
    assert_eq!(screen_of(&state, true, true), Screen::VerificationGate);

    state.apply(Intent::MarkVerified).unwrap();
    assert_eq!(
        screen_of(&state, true, true),
        Screen::Main {
            section: Section::Home
        }
    );

    state.apply(Intent::CompletePilar { id: 0 }).unwrap();
    assert!(state.pilares[0].completado);
    assert!(!state.pilares[1].bloqueado);
    assert_eq!(state.stats.current_streak, 1);
    assert_eq!(state.stats.xp, 100);
    assert_eq!(state.stats.level(), 1);
    assert_eq!(state.take_level_up(), None);
}

#[test]
fn guest_skips_verification_and_reaches_main_directly() {
    let mut state = AppState::default();
    state.apply(Intent::ChooseStart).unwrap();
    state
        .apply(Intent::EnterGuest {
            device_id: "dev-42".into(),
        })
        .unwrap();
    assert_eq!(state.identity.name.as_deref(), Some("Invitado"));
    assert_eq!(
        screen_of(&state, true, false),
        Screen::Onboarding {
            step: OnboardingStep::Quiz
        }
    );

    state.apply(Intent::AdvanceOnboarding).unwrap();
    state
        .apply(Intent::CompleteOnboarding(OnboardingData {
            name: "Invitado".into(),
            ..OnboardingData::default()
        }))
        .unwrap();

    // No verification gate for guests, regardless of is_verified.
    assert!(!state.identity.is_verified);
    assert_eq!(
        screen_of(&state, true, false),
        Screen::Main {
            section: Section::Home
        }
    );
}

#[test]
fn two_quick_completions_fire_exactly_one_level_up() {
    let mut state = AppState::default();
    state
        .apply(Intent::CompleteOnboarding(OnboardingData {
            name: "Ana".into(),
            ..OnboardingData::default()
        }))
        .unwrap();
    state.identity.is_verified = true;

    // Simulate a returning profile at 900 XP.
    let profile: ciclo_sync::gateway::ProfileRow =
        serde_json::from_str(r#"{"name":"Ana","xp":900}"#).unwrap();
    state.apply_remote(ciclo_sync::gateway::UserData {
        profile: Some(profile),
        ..Default::default()
    });

    state.apply(Intent::CompletePilar { id: 0 }).unwrap();
    state.apply(Intent::CompletePilar { id: 1 }).unwrap();

    assert_eq!(state.stats.xp, 1100);
    assert_eq!(state.stats.level(), 2);
    let event = state.take_level_up().expect("one level-up event");
    assert_eq!((event.from, event.to), (1, 2));
    assert_eq!(state.take_level_up(), None);
}

#[test]
fn goal_progress_tracks_sub_task_mutations() {
    let mut state = AppState::default();
    let goal_id = state.goals[0].id.clone();

    for name in ["definir oferta", "primer cliente", "publicar"] {
        state
            .apply(Intent::AddSubTask {
                goal: goal_id.clone(),
                task_name: name.into(),
            })
            .unwrap();
    }
    state
        .apply(Intent::ToggleSubTask {
            goal: goal_id.clone(),
            index: 0,
        })
        .unwrap();
    assert_eq!(state.goals[0].progress_percentage, 33);

    state
        .apply(Intent::AddSubTask {
            goal: goal_id,
            task_name: "cobrar".into(),
        })
        .unwrap();
    assert_eq!(state.goals[0].progress_percentage, 25);
}

#[test]
fn logout_from_stats_screen_resets_everything() {
    let mut state = AppState::default();
    state
        .apply(Intent::CompleteOnboarding(OnboardingData {
            name: "Ana".into(),
            ..OnboardingData::default()
        }))
        .unwrap();
    state.identity.is_verified = true;
    state.apply(Intent::CompletePilar { id: 0 }).unwrap();
    state
        .apply(Intent::AddConfession {
            content: "hoy caí".into(),
            kind: ConfessionKind::Text,
            pilar_id: 0,
            session_name: None,
            note: None,
        })
        .unwrap();
    state.apply(Intent::SetSection(Section::Racha)).unwrap();
    assert_eq!(
        screen_of(&state, true, true),
        Screen::Main {
            section: Section::Racha
        }
    );

    // Session gone: everything back to documented defaults, landing next.
    state.reset();
    assert_eq!(screen_of(&state, true, false), Screen::AnonymousLanding);
    assert!(state.confessions.is_empty());
    assert_eq!(state.stats.xp, 0);
    assert_eq!(state.section, Section::Home);
    assert!(state.pilares[1].bloqueado);
}

#[test]
fn bunker_is_a_modal_over_main() {
    let mut state = AppState::default();
    state
        .apply(Intent::CompleteOnboarding(OnboardingData {
            name: "Ana".into(),
            ..OnboardingData::default()
        }))
        .unwrap();
    state.identity.is_verified = true;

    state.apply(Intent::EnterBunker).unwrap();
    assert_eq!(screen_of(&state, true, true), Screen::Bunker);

    state.apply(Intent::ExitBunker).unwrap();
    assert_eq!(
        screen_of(&state, true, true),
        Screen::Main {
            section: Section::Home
        }
    );
}
