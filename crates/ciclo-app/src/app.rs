use anyhow::Context;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error};

use ciclo_core::gating::{resolve_screen, OnboardingStep, Screen};
use ciclo_mentor::{build_context, ChatStream, ChatTurn, MentorClient, MentorConfig};
use ciclo_sync::auth::{AuthClient, AuthError};
use ciclo_sync::config::BackendConfig;
use ciclo_sync::device::DeviceIdStore;
use ciclo_sync::gateway::SyncGateway;
use ciclo_sync::license::{CheckoutRequest, CheckoutSession, FunctionsClient};
use ciclo_sync::session::{SessionManager, SessionState, TokenStore};
use ciclo_sync::SyncError;

use crate::queue::SaveQueue;
use crate::state::{AppState, Intent};

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The headless application: session lifecycle, local state, save queue
/// and the gating decision, wired together.
///
/// The presentation layer drives it with four calls: `init` once,
/// `dispatch` for every user intent, `screen` for what to render, and
/// the auth methods for login/logout. Everything else is internal.
pub struct App {
    sessions: SessionManager,
    gateway: SyncGateway,
    functions: FunctionsClient,
    mentor: Option<MentorClient>,
    devices: DeviceIdStore,
    queue: SaveQueue,
    state: AppState,
    session_view: SessionState,
}

impl App {
    pub fn new(
        backend: BackendConfig,
        token_store: TokenStore,
        devices: DeviceIdStore,
        mentor: Option<MentorConfig>,
    ) -> Self {
        let sessions = SessionManager::new(AuthClient::new(backend.clone()), token_store);
        let gateway = SyncGateway::new(backend.clone());
        let queue = SaveQueue::spawn(gateway.clone(), sessions.subscribe());
        Self {
            sessions,
            functions: FunctionsClient::new(backend),
            mentor: mentor.map(MentorClient::new),
            devices,
            queue,
            gateway,
            state: AppState::default(),
            session_view: SessionState::Resolving,
        }
    }

    /// Construct from environment variables and the default on-disk
    /// stores. The mentor client is optional: without an API key the
    /// chat section degrades, everything else works.
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = BackendConfig::from_env().context("backend configuration")?;
        let token_store = TokenStore::new().context("token store")?;
        let devices = DeviceIdStore::new().context("device id store")?;
        let mentor = MentorConfig::from_env().ok();
        Ok(Self::new(backend, token_store, devices, mentor))
    }

    /// Resolve the initial session and load data if one was restored.
    /// Must complete before the first `screen()` call routes anywhere
    /// meaningful; until then the screen is `Loading`.
    pub async fn init(&mut self) {
        self.sessions.init().await;
        let current = self.sessions.current();
        self.on_session_change(current).await;
    }

    /// React to a session transition: a new session triggers a full
    /// fetch into fresh state; its absence tears everything down.
    pub async fn on_session_change(&mut self, session: SessionState) {
        match &session {
            SessionState::SignedIn(s) => {
                debug!(user = %s.user_id, "session established, loading data");
                self.state.reset();
                let data = self.gateway.fetch_all(s).await;
                self.state.apply_remote(data);
            }
            SessionState::SignedOut => {
                debug!("session ended, resetting local state");
                self.state.reset();
            }
            SessionState::Resolving => {}
        }
        self.session_view = session;
    }

    /// The screen to render right now.
    pub fn screen(&self) -> Screen {
        resolve_screen(&self.state.gating_input(
            self.session_view.is_resolved(),
            self.session_view.session().is_some(),
        ))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Apply one user intent: mutate local state synchronously, then
    /// enqueue whatever saves it produced. Rejected intents (stale goal
    /// ids, out-of-range indices) are logged and ignored.
    pub fn dispatch(&mut self, intent: Intent) {
        match self.state.apply(intent) {
            Ok(ops) => {
                for op in ops {
                    self.queue.enqueue(op);
                }
            }
            Err(e) => error!(error = %e, "intent rejected"),
        }
    }

    /// Enter guest mode using the installation's device id.
    pub fn enter_guest(&mut self) {
        match self.devices.load_or_create() {
            Ok(device_id) => self.dispatch(Intent::EnterGuest { device_id }),
            Err(e) => error!(error = %e, "device id unavailable, guest entry aborted"),
        }
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        self.sessions.sign_in(email, password).await?;
        self.after_auth().await;
        Ok(())
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        self.sessions.sign_up(email, password).await?;
        self.after_auth().await;
        Ok(())
    }

    /// Post-auth: load the profile, then resume onboarding at the quiz
    /// when the backend shows no completed census.
    async fn after_auth(&mut self) {
        let current = self.sessions.current();
        self.on_session_change(current).await;
        if !self.state.is_onboarded {
            self.state.onboarding_step = OnboardingStep::Quiz;
        }
    }

    pub async fn sign_out(&mut self) {
        self.sessions.sign_out().await;
        let current = self.sessions.current();
        self.on_session_change(current).await;
    }

    /// Stream of session transitions, for shells that prefer reactive
    /// wiring over calling the auth methods on this type.
    pub fn session_stream(&self) -> WatchStream<SessionState> {
        WatchStream::new(self.sessions.subscribe())
    }

    // -----------------------------------------------------------------------
    // Verification / checkout
    // -----------------------------------------------------------------------

    /// Validate a license key. On success the backend has flipped the
    /// server-side flag; the local flag follows and persists.
    pub async fn validate_license(&mut self, license_key: &str) -> Result<(), SyncError> {
        let Some(session) = self.session_view.session().cloned() else {
            return Err(SyncError::Rejected("sin sesión activa".into()));
        };
        self.functions
            .validate_license(license_key, &session.access_token)
            .await?;
        self.dispatch(Intent::MarkVerified);
        Ok(())
    }

    /// Create a checkout session; the shell performs the redirect.
    pub async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, SyncError> {
        let Some(session) = self.session_view.session() else {
            return Err(SyncError::Rejected("sin sesión activa".into()));
        };
        self.functions
            .create_checkout_session(request, &session.access_token)
            .await
    }

    // -----------------------------------------------------------------------
    // Mentor
    // -----------------------------------------------------------------------

    /// Send a mentor message with the current state as context. Returns
    /// `None` when no mentor API key is configured.
    pub fn mentor_send(&self, user_message: &str, history: &[ChatTurn]) -> Option<ChatStream> {
        let mentor = self.mentor.as_ref()?;
        let context = build_context(
            &self.state.identity,
            &self.state.confessions,
            &self.state.goals,
            &self.state.stats,
        );
        Some(mentor.send(user_message, history, &context))
    }
}
