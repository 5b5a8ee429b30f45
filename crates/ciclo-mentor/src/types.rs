use serde::{Deserialize, Serialize};

use crate::error::MentorError;

// ─── Role / ChatTurn ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One turn of the mentor conversation as the UI holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

// ─── MentorConfig ─────────────────────────────────────────────────────────

/// Connection settings for the completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model() -> String {
    "gemini-flash-latest".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl MentorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            base_url: default_base_url(),
        }
    }

    /// Read `CICLO_MENTOR_API_KEY` (and optional `CICLO_MENTOR_MODEL`)
    /// from the environment.
    pub fn from_env() -> Result<Self, MentorError> {
        let api_key =
            std::env::var("CICLO_MENTOR_API_KEY").map_err(|_| MentorError::MissingApiKey)?;
        let mut cfg = Self::new(api_key);
        if let Ok(model) = std::env::var("CICLO_MENTOR_MODEL") {
            cfg.model = model;
        }
        Ok(cfg)
    }

    pub fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_in() {
        let cfg: MentorConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(cfg.model, "gemini-flash-latest");
        assert!(cfg.base_url.contains("generativelanguage"));
    }

    #[test]
    fn stream_url_includes_model_and_sse() {
        let cfg = MentorConfig {
            api_key: "k".into(),
            model: "gemini-flash-latest".into(),
            base_url: "https://api.example.com/v1beta/".into(),
        };
        assert_eq!(
            cfg.stream_url(),
            "https://api.example.com/v1beta/models/gemini-flash-latest:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn roles_serialize_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
        assert_eq!(Role::User.as_str(), "user");
    }
}
