//! `ciclo-app` — the headless application shell.
//!
//! Ties the workspace together: the session lifecycle manager publishes
//! transitions, a session triggers one aggregate load into [`AppState`],
//! the gating machine in `ciclo-core` decides the active [`Screen`], and
//! user intents mutate state optimistically while the [`SaveQueue`]
//! persists best-effort in the background.
//!
//! ```text
//! SessionManager ──watch──▶ App::on_session_change
//!                               │ fetch_all / reset
//!                               ▼
//!                           AppState ──resolve_screen──▶ Screen
//!                               │
//!            dispatch(Intent)   │ optimistic mutation
//!                               ▼
//!                           SaveQueue ──fire-and-forget──▶ SyncGateway
//! ```
//!
//! [`Screen`]: ciclo_core::gating::Screen

pub mod app;
pub mod queue;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use queue::{SaveOp, SaveQueue};
pub use state::{AppState, Intent, OnboardingData};
pub use telemetry::init_tracing;
