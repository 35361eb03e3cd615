//! Error types for the task protocol

use crate::task::SessionId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, TaskError>;

/// Rejections surfaced to the caller of store/fetch
#[derive(Debug, Error)]
pub enum TaskError {
    /// Task type is not in the registry
    #[error("Unknown task type: {0}")]
    InvalidKey(String),

    /// Argument failed the digits-only allow-list
    #[error("Invalid argument for {task}: {argument:?} (only decimal digits are accepted)")]
    InvalidArgument { task: String, argument: String },

    /// A non-terminal run already occupies the key
    #[error("Task {task} is busy for session {session}, try again later")]
    Busy { task: String, session: SessionId },
}

impl TaskError {
    /// 재시도 가능한 에러인지 확인
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::Busy { .. })
    }
}

/// Failure to submit a worker process (never its eventual outcome)
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Worker program not found: {}", .0.display())]
    MissingProgram(PathBuf),

    #[error("Failed to spawn {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
