use async_trait::async_trait;
use std::sync::Arc;

use super::executor::StepExecutor;
use super::failure::StepResult;
use crate::functions::{GetResultInput, StatusBook, TodoStatus};
use crate::llm::{ChatMessage, LlmChatInput, LlmChatStep};

/// The steps the execute-todo workflow suspends on
#[async_trait]
pub trait TodoSteps: Send + Sync {
    async fn llm_chat(&self, input: LlmChatInput) -> StepResult<ChatMessage>;

    async fn get_result(&self, input: GetResultInput) -> StepResult<TodoStatus>;
}

/// In-process step host: the chat step and status book, each run through a `StepExecutor`
#[derive(Clone)]
pub struct LocalSteps {
    chat: LlmChatStep,
    status: Arc<StatusBook>,
    executor: StepExecutor,
}

impl LocalSteps {
    pub fn new(chat: LlmChatStep, status: Arc<StatusBook>, executor: StepExecutor) -> Self {
        Self {
            chat,
            status,
            executor,
        }
    }

    pub fn status_book(&self) -> Arc<StatusBook> {
        Arc::clone(&self.status)
    }
}

#[async_trait]
impl TodoSteps for LocalSteps {
    async fn llm_chat(&self, input: LlmChatInput) -> StepResult<ChatMessage> {
        self.executor
            .run("llm_chat", || self.chat.invoke(input.clone()))
            .await
    }

    async fn get_result(&self, input: GetResultInput) -> StepResult<TodoStatus> {
        self.executor
            .run("get_result", || self.status.get_result(input.clone()))
            .await
    }
}
