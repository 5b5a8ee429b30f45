use serde::{Deserialize, Serialize};

/// Sentinel name assigned when the user enters guest mode. A guest skips
/// authentication and the verification gate for the rest of the local
/// session.
pub const GUEST_NAME: &str = "Invitado";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The user's identity profile: census fields collected during onboarding
/// plus the identity-map statements edited from the main shell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub north_star: String,
    #[serde(default)]
    pub current_identity: String,
    #[serde(default)]
    pub new_identity: String,
    #[serde(default)]
    pub blocker_reason: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

impl Identity {
    /// True when this identity carries the guest sentinel name.
    pub fn is_guest(&self) -> bool {
        self.name.as_deref() == Some(GUEST_NAME)
    }

    /// Switch this identity into guest mode.
    pub fn enter_guest(&mut self, device_id: String) {
        self.name = Some(GUEST_NAME.to_string());
        self.blocker_reason = Some(GUEST_NAME.to_string());
        self.device_id = Some(device_id);
    }

    /// Whether a fetched profile implies the user already onboarded.
    /// Deliberately relaxed (any of name, profession, verified) so a
    /// returning user never gets stuck in the onboarding loop.
    pub fn implies_onboarded(&self) -> bool {
        self.name.is_some() || self.profession.is_some() || self.is_verified
    }

    /// First name in upper case, for display surfaces. `None` until the
    /// census step has run.
    pub fn display_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .and_then(|n| n.split_whitespace().next())
            .map(|n| n.to_uppercase())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
