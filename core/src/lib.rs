// Todoflow Core Library
// Chat-completion steps and the execute-todo workflow

pub mod functions;
pub mod llm;
pub mod step;
pub mod workflow;

// Export core types
pub use functions::{GetResultInput, StatusBook, TodoStatus};
pub use llm::{ChatMessage, LlmChatInput, LlmChatStep, LlmClient, LlmClientConfig};
pub use step::{LocalSteps, StepExecutor, StepFailure, StepOptions, StepResult, TodoSteps};
pub use workflow::{
    execute_todo_workflow, ExecuteTodoInput, TodoExecutionResult, STATUS_SETTLE_DELAY,
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TodoflowError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Step failed: {0}")]
    Step(#[from] StepFailure),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TodoflowError>;
