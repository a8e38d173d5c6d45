use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::adapter::{from_wire_format, to_wire_format};
use super::client::{ChatCompletionRequest, ChatCompletions, LlmClient, LlmClientConfig};
use super::message::{ChatMessage, ToolDefinition};
use crate::step::{StepFailure, StepResult};
use crate::TodoflowError;

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 300;

/// Input of the `llm_chat` step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LlmChatInput {
    #[serde(default, alias = "system_content")]
    pub system_content: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens", alias = "max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub tools: Option<Vec<ToolDefinition>>,
}

impl LlmChatInput {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            system_content: None,
            model: default_model(),
            messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            tools: None,
        }
    }

    pub fn with_system(mut self, system_content: impl Into<String>) -> Self {
        self.system_content = Some(system_content.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }
}

pub(crate) fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

pub(crate) fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

pub(crate) fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

/// Build the request body; streaming is never requested
pub fn build_chat_request(input: &LlmChatInput) -> ChatCompletionRequest {
    ChatCompletionRequest {
        messages: to_wire_format(&input.messages, input.system_content.as_deref()),
        model: input.model.clone(),
        temperature: input.temperature,
        max_tokens: input.max_tokens,
        tools: input.tools.clone().filter(|t| !t.is_empty()),
        stream: false,
    }
}

/// Run one chat completion and return the first choice as an assistant message.
///
/// Calls the client exactly once. Every failure, including an empty `choices`
/// array, comes back non-retryable.
pub async fn llm_chat(
    client: &dyn ChatCompletions,
    input: LlmChatInput,
) -> StepResult<ChatMessage> {
    let request = build_chat_request(&input);
    debug!(
        target: "llm_chat",
        params = %serde_json::to_string(&request).unwrap_or_default(),
        "OpenAI chat completion params"
    );

    let completion = client.create(request).await.map_err(chat_failure)?;
    let message = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| {
            chat_failure(TodoflowError::LlmError(
                "completion returned no choices".to_string(),
            ))
        })?;
    Ok(from_wire_format(message))
}

fn chat_failure(err: TodoflowError) -> StepFailure {
    StepFailure::non_retryable(format!("Error OpenAI chat: {err}"))
}

/// The chat step bound to a client
#[derive(Clone)]
pub struct LlmChatStep {
    client: Arc<dyn ChatCompletions>,
}

impl LlmChatStep {
    pub fn new(client: Arc<dyn ChatCompletions>) -> Self {
        Self { client }
    }

    /// Build the step around an `LlmClient`; construction errors are step failures too
    pub fn from_config(cfg: LlmClientConfig) -> StepResult<Self> {
        let client = LlmClient::new(cfg).map_err(chat_failure)?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn from_env() -> StepResult<Self> {
        Self::from_config(LlmClientConfig::default())
    }

    pub async fn invoke(&self, input: LlmChatInput) -> StepResult<ChatMessage> {
        llm_chat(self.client.as_ref(), input).await
    }
}
