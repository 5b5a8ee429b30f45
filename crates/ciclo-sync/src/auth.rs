use chrono::{Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::config::BackendConfig;
use crate::session::Session;

// ---------------------------------------------------------------------------
// AuthError
// ---------------------------------------------------------------------------

/// Auth failures surfaced to the user. Display strings are the
/// user-facing copy; `DuplicateRegistration` is recoverable by switching
/// the form to sign-in mode.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credenciales inválidas. Revisa tu correo y contraseña.")]
    InvalidCredentials,

    #[error("Ese correo ya está registrado. Inicia sesión.")]
    DuplicateRegistration,

    #[error("Demasiados intentos. Espera un momento y reintenta.")]
    RateLimited,

    #[error("auth service error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl AuthResponse {
    fn into_session(self) -> Session {
        Session {
            user_id: self.user.id,
            email: self.user.email,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
        }
    }
}

/// Error body shape of the auth service. Field names vary by endpoint
/// and version; all are optional and the first populated one wins.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl AuthErrorBody {
    fn message(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// AuthClient
// ---------------------------------------------------------------------------

/// Password-grant client for the backend auth service.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    cfg: BackendConfig,
}

impl AuthClient {
    pub fn new(cfg: BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg,
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let resp = self
            .http
            .post(self.cfg.auth_url("signup"))
            .header("apikey", &self.cfg.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::session_or_error(resp).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let resp = self
            .http
            .post(format!(
                "{}?grant_type=password",
                self.cfg.auth_url("token")
            ))
            .header("apikey", &self.cfg.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::session_or_error(resp).await
    }

    /// Exchange a stored refresh token for a fresh session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let resp = self
            .http
            .post(format!(
                "{}?grant_type=refresh_token",
                self.cfg.auth_url("token")
            ))
            .header("apikey", &self.cfg.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        Self::session_or_error(resp).await
    }

    /// Revoke the session server-side. Local teardown proceeds whether or
    /// not this call succeeds.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let resp = self
            .http
            .post(self.cfg.auth_url("logout"))
            .header("apikey", &self.cfg.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::classify(resp).await)
        }
    }

    async fn session_or_error(resp: reqwest::Response) -> Result<Session, AuthError> {
        if resp.status().is_success() {
            let body: AuthResponse = resp.json().await?;
            Ok(body.into_session())
        } else {
            Err(Self::classify(resp).await)
        }
    }

    /// Map an auth service error response onto the user-facing taxonomy.
    async fn classify(resp: reqwest::Response) -> AuthError {
        let status = resp.status().as_u16();
        let body: AuthErrorBody = resp.json().await.unwrap_or_default();
        let message = body.message();
        let code = body.error_code.as_deref().unwrap_or("");

        if status == 429 || code == "over_request_rate_limit" {
            return AuthError::RateLimited;
        }
        if code == "user_already_exists"
            || code == "email_exists"
            || message.contains("already registered")
        {
            return AuthError::DuplicateRegistration;
        }
        if code == "invalid_credentials" || message.contains("Invalid login credentials") {
            return AuthError::InvalidCredentials;
        }
        AuthError::Backend { status, message }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
