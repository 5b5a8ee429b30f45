use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::error::{Result, SyncError};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Checkout-session request. The shell supplies the return URLs; the
/// backend function creates the session with the payment provider and
/// hands back a redirect URL.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    #[serde(default)]
    pub session_id: Option<String>,
    pub url: String,
}

/// Function responses answer 200 for both outcomes and carry either a
/// success payload or an `error` string.
#[derive(Debug, Deserialize)]
struct FunctionOutcome {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// FunctionsClient
// ---------------------------------------------------------------------------

/// Client for the backend's deployed functions: license validation and
/// checkout-session creation. Both calls surface their errors in-band at
/// the call site and never touch local application state.
#[derive(Debug, Clone)]
pub struct FunctionsClient {
    http: reqwest::Client,
    cfg: BackendConfig,
}

impl FunctionsClient {
    pub fn new(cfg: BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg,
        }
    }

    /// Validate a license key. On success the backend has already flipped
    /// `is_verified` server-side; the caller updates the local flag.
    pub async fn validate_license(&self, license_key: &str, access_token: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.cfg.functions_url("validate-license"))
            .header("apikey", &self.cfg.anon_key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "licenseKey": license_key }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SyncError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let outcome: FunctionOutcome = resp.json().await?;
        if outcome.success {
            Ok(())
        } else {
            Err(SyncError::Rejected(
                outcome
                    .error
                    .unwrap_or_else(|| "La licencia no es válida o ha expirado.".into()),
            ))
        }
    }

    /// Create a checkout session and return the provider's redirect URL.
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
        access_token: &str,
    ) -> Result<CheckoutSession> {
        let resp = self
            .http
            .post(self.cfg.functions_url("create-checkout-session"))
            .header("apikey", &self.cfg.anon_key)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SyncError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = resp.json().await?;
        if let Some(error) = body.get("error").and_then(|e| e.as_str()) {
            return Err(SyncError::Rejected(error.to_string()));
        }
        Ok(serde_json::from_value(body)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
