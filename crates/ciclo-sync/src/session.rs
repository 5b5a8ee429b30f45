use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::auth::{AuthClient, AuthError};
use crate::error::{Result, SyncError};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An authenticated session. Absence of a `Session` means "logged out"
/// and obliges every consumer to reset local state to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle manager's published state. `Resolving` is only ever the
/// initial value — after `init` completes the state is always one of the
/// other two, so routing never observes an undefined session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Resolving,
    SignedOut,
    SignedIn(Session),
}

impl SessionState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, SessionState::Resolving)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::SignedIn(s) => Some(s),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TokenStore
// ---------------------------------------------------------------------------

/// Persists the refresh token on disk so the session survives restarts.
///
/// One small file under the per-user data dir, created lazily on the
/// first save and removed on logout.
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    /// Store rooted at `~/.ciclo`.
    pub fn new() -> Result<Self> {
        let home = home::home_dir().ok_or(SyncError::HomeNotFound)?;
        Ok(Self::at(home.join(".ciclo")))
    }

    /// Store rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn load(&self) -> Option<String> {
        std::fs::read_to_string(self.path())
            .ok()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    }

    pub fn save(&self, refresh_token: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(), refresh_token)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let p = self.path();
        if p.exists() {
            std::fs::remove_file(&p)?;
        }
        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.dir.join("refresh_token")
    }
}

// ---------------------------------------------------------------------------
// SessionManager
// ---------------------------------------------------------------------------

/// Single authoritative owner of the current session.
///
/// Consumers subscribe to the watch channel rather than polling; the
/// manager publishes on every change (initial resolution, login, logout).
/// `init` always resolves to a defined state — a failed restore becomes
/// `SignedOut`, never a hang or an error.
pub struct SessionManager {
    auth: AuthClient,
    store: TokenStore,
    tx: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(auth: AuthClient, store: TokenStore) -> Self {
        let (tx, _rx) = watch::channel(SessionState::Resolving);
        Self { auth, store, tx }
    }

    /// Subscribe to session changes. The receiver's current value is the
    /// present state; `changed()` wakes on every transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Resolve the initial session exactly once: restore the persisted
    /// refresh token and exchange it, or land on `SignedOut`.
    pub async fn init(&self) {
        let state = match self.store.load() {
            None => SessionState::SignedOut,
            Some(token) => match self.auth.refresh(&token).await {
                Ok(session) => {
                    if let Err(e) = self.store.save(&session.refresh_token) {
                        warn!(error = %e, "failed to persist rotated refresh token");
                    }
                    SessionState::SignedIn(session)
                }
                Err(e) => {
                    // Treat any restore failure as logged-out; the user can
                    // sign in again. Stale tokens are cleared.
                    warn!(error = %e, "session restore failed, starting signed out");
                    let _ = self.store.clear();
                    SessionState::SignedOut
                }
            },
        };
        debug!(resolved = ?matches!(state, SessionState::SignedIn(_)), "session resolved");
        let _ = self.tx.send(state);
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> std::result::Result<Session, AuthError> {
        let session = self.auth.sign_in(email, password).await?;
        self.publish(session.clone());
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> std::result::Result<Session, AuthError> {
        let session = self.auth.sign_up(email, password).await?;
        self.publish(session.clone());
        Ok(session)
    }

    /// Logout is terminal for local state: revoke server-side
    /// (best-effort), drop the stored token, publish `SignedOut`.
    pub async fn sign_out(&self) {
        if let SessionState::SignedIn(session) = self.current() {
            if let Err(e) = self.auth.sign_out(&session.access_token).await {
                warn!(error = %e, "server-side sign-out failed");
            }
        }
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear stored refresh token");
        }
        let _ = self.tx.send(SessionState::SignedOut);
    }

    fn publish(&self, session: Session) {
        if let Err(e) = self.store.save(&session.refresh_token) {
            warn!(error = %e, "failed to persist refresh token");
        }
        let _ = self.tx.send(SessionState::SignedIn(session));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
