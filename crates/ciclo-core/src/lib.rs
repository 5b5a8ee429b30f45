pub mod confession;
pub mod error;
pub mod gating;
pub mod goal;
pub mod identity;
pub mod pilar;
pub mod progress;
pub mod spark;
pub mod stats;
pub mod types;

pub use error::{CicloError, Result};
pub use gating::{resolve_screen, GatingInput, OnboardingStep, Screen};
pub use identity::{Identity, GUEST_NAME};
pub use pilar::{Pilar, PilarDefinition, PilarProgress};
pub use stats::UserStats;
pub use types::{ConfessionKind, Section};
