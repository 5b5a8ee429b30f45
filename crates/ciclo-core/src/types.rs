use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// Navigable sections of the main application shell.
///
/// `Recursos` is a read-only library view; it exists so the shell can route
/// to it, but it carries no state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Home,
    Mapa,
    Mentor,
    Herramientas,
    Racha,
    Recursos,
}

impl Section {
    pub fn all() -> &'static [Section] {
        &[
            Section::Home,
            Section::Mapa,
            Section::Mentor,
            Section::Herramientas,
            Section::Racha,
            Section::Recursos,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Mapa => "mapa",
            Section::Mentor => "mentor",
            Section::Herramientas => "herramientas",
            Section::Racha => "racha",
            Section::Recursos => "recursos",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Section {
    type Err = crate::error::CicloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Section::Home),
            "mapa" => Ok(Section::Mapa),
            "mentor" => Ok(Section::Mentor),
            "herramientas" => Ok(Section::Herramientas),
            "racha" => Ok(Section::Racha),
            "recursos" => Ok(Section::Recursos),
            _ => Err(crate::error::CicloError::InvalidSection(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfessionKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfessionKind {
    Text,
    Voice,
    Video,
}

impl ConfessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfessionKind::Text => "text",
            ConfessionKind::Voice => "voice",
            ConfessionKind::Video => "video",
        }
    }
}

impl fmt::Display for ConfessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConfessionKind {
    type Err = crate::error::CicloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ConfessionKind::Text),
            "voice" => Ok(ConfessionKind::Voice),
            "video" => Ok(ConfessionKind::Video),
            _ => Err(crate::error::CicloError::InvalidConfessionKind(
                s.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
