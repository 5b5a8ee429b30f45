use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("operación rechazada: {0}")]
    Rejected(String),

    #[error("missing configuration: set {0}")]
    MissingConfig(&'static str),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,
}

pub type Result<T> = std::result::Result<T, SyncError>;
