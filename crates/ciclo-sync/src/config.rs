use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

/// Connection settings for the remote data store. The anon key is the
/// project's publishable key; per-user authorization travels as a Bearer
/// token alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Read `CICLO_BACKEND_URL` and `CICLO_ANON_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("CICLO_BACKEND_URL")
            .map_err(|_| SyncError::MissingConfig("CICLO_BACKEND_URL"))?;
        let anon_key = std::env::var("CICLO_ANON_KEY")
            .map_err(|_| SyncError::MissingConfig("CICLO_ANON_KEY"))?;
        Ok(Self::new(base_url, anon_key))
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base())
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base())
    }

    pub fn functions_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{name}", self.base())
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
