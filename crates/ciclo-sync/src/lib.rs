//! Remote-backend client for the ciclo application core.
//!
//! Three concerns live here, each wrapping the backend-as-a-service
//! provider behind a typed surface:
//!
//! - [`session`]: the session lifecycle manager — single authoritative
//!   owner of the current auth session, published over a watch channel.
//! - [`gateway`]: the sync gateway — one aggregate load for all user
//!   entities plus one save operation per entity kind.
//! - [`license`]: the paywall function calls (license validation and
//!   checkout-session creation).
//!
//! Save operations are best-effort by design: callers apply mutations
//! locally first and the queue dispatches saves fire-and-forget; a
//! failure is logged and dropped. Local state, not the backend, is the
//! source of truth for the active session.

pub mod auth;
pub mod config;
pub mod device;
pub mod error;
pub mod gateway;
pub mod license;
pub mod session;

pub use auth::{AuthClient, AuthError};
pub use config::BackendConfig;
pub use device::DeviceIdStore;
pub use error::{Result, SyncError};
pub use gateway::{ProfilePatch, ProfileRow, SyncGateway, UserData};
pub use license::{CheckoutRequest, CheckoutSession, FunctionsClient};
pub use session::{Session, SessionManager, SessionState, TokenStore};
