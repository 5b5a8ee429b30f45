use thiserror::Error;

#[derive(Debug, Error)]
pub enum CicloError {
    #[error("unknown confession kind: {0}")]
    InvalidConfessionKind(String),

    #[error("unknown section: {0}")]
    InvalidSection(String),

    #[error("goal not found: {0}")]
    GoalNotFound(String),

    #[error("sub-task index {index} out of range for goal {goal}")]
    SubTaskOutOfRange { goal: String, index: usize },
}

pub type Result<T> = std::result::Result<T, CicloError>;
