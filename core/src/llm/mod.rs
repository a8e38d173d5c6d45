//! LLM module: message model, wire adapter, HTTP client, and the chat step
//!
//! This module provides:
//! - `ChatMessage` and the tool schema types
//! - `to_wire_format` / `from_wire_format` for shaping request and response messages
//! - `ChatCompletions`, `LlmClient`, `LlmClientConfig` for talking to OpenAI-compatible backends
//! - `llm_chat` and `LlmChatStep`, the step the todo workflow calls

mod adapter;
mod chat;
mod client;
mod message;

pub use adapter::{from_wire_format, to_wire_format, ResponseMessage, WireMessage};
pub use chat::{
    build_chat_request, llm_chat, LlmChatInput, LlmChatStep, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
pub(crate) use chat::{default_max_tokens, default_model, default_temperature};
pub use client::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatCompletions, LlmClient,
    LlmClientConfig,
};
pub use message::{ChatMessage, FunctionCall, FunctionDefinition, Role, ToolCall, ToolDefinition};
