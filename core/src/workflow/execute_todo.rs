use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::functions::GetResultInput;
use crate::llm::{
    default_max_tokens, default_model, default_temperature, ChatMessage, LlmChatInput,
};
use crate::step::TodoSteps;
use crate::{Result, TodoflowError};

/// Pause between the chat step and the status fetch.
///
/// Status updates for a todo are written elsewhere and asynchronously (often
/// triggered by the same chat). Waiting here lets those writes land before
/// `get_result` reads them. Removing it makes the fetched status stale.
pub const STATUS_SETTLE_DELAY: Duration = Duration::from_millis(2000);

/// Shown when the model returned no content
pub const NO_DETAILS: &str = "No details available";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTodoInput {
    #[serde(default)]
    pub todo_title: String,
    #[serde(default)]
    pub todo_id: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub system_content: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ExecuteTodoInput {
    pub fn new(
        todo_title: impl Into<String>,
        todo_id: impl Into<String>,
        messages: Vec<ChatMessage>,
    ) -> Self {
        Self {
            todo_title: todo_title.into(),
            todo_id: todo_id.into(),
            messages,
            system_content: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }

    fn chat_input(&self) -> LlmChatInput {
        LlmChatInput {
            system_content: self.system_content.clone(),
            model: self.model.clone(),
            messages: self.messages.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoExecutionResult {
    pub todo_id: String,
    pub todo_title: String,
    pub details: String,
    pub status: String,
}

/// Execute a todo: chat with the model about it, let its status settle, then
/// report the model's details alongside the current status.
///
/// Fails before any step runs when the title or id is empty. Step failures are
/// returned as `TodoflowError::Step`; a failed chat means no status fetch.
#[tracing::instrument(name = "workflow.execute_todo", skip(steps, input), fields(todo_id = %input.todo_id))]
pub async fn execute_todo_workflow<S>(
    steps: &S,
    input: ExecuteTodoInput,
) -> Result<TodoExecutionResult>
where
    S: TodoSteps + ?Sized,
{
    if input.todo_title.is_empty() || input.todo_id.is_empty() {
        return Err(TodoflowError::Validation(
            "todoTitle and todoId are required".to_string(),
        ));
    }

    let chat_response = steps.llm_chat(input.chat_input()).await?;

    debug!(target: "workflow", delay_ms = STATUS_SETTLE_DELAY.as_millis() as u64, "Waiting for status to settle");
    sleep(STATUS_SETTLE_DELAY).await;

    let ExecuteTodoInput {
        todo_title,
        todo_id,
        ..
    } = input;
    let result = steps
        .get_result(GetResultInput {
            todo_title: todo_title.clone(),
            todo_id: todo_id.clone(),
        })
        .await?;

    let details = match chat_response.content() {
        "" => NO_DETAILS.to_string(),
        content => content.to_string(),
    };

    let todo_details = TodoExecutionResult {
        todo_id,
        todo_title,
        details,
        status: result.status,
    };
    info!(target: "workflow", todo_details = ?todo_details, "Todo Details");

    Ok(todo_details)
}
