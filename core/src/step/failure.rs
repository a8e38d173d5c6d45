use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a step, classified for the host's retry decision
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct StepFailure {
    pub message: String,
    pub retryable: bool,
}

impl StepFailure {
    /// The host surfaces this failure instead of attempting the step again
    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

pub type StepResult<T> = std::result::Result<T, StepFailure>;
