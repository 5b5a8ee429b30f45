use thiserror::Error;

/// Configuration failures are the only errors this crate propagates;
/// transport and service failures during a chat surface in-band as
/// conversation content (see `stream`).
#[derive(Debug, Error)]
pub enum MentorError {
    #[error("mentor API key not configured: set CICLO_MENTOR_API_KEY")]
    MissingApiKey,
}
