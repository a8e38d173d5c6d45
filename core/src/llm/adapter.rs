use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, Role, ToolCall};

/// Message as sent in a chat completions request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Message as returned in `choices[].message`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// Convert chat messages into the request `messages` array.
///
/// A non-empty `system_content` is prepended as its own system message, even
/// when `messages` already starts with one. Ordering is otherwise untouched.
pub fn to_wire_format(
    messages: &[ChatMessage],
    system_content: Option<&str>,
) -> Vec<WireMessage> {
    let mut wire = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = system_content.filter(|s| !s.is_empty()) {
        wire.push(WireMessage {
            role: Role::System,
            content: system.to_string(),
            tool_call_id: None,
        });
    }
    wire.extend(messages.iter().map(|m| WireMessage {
        role: m.role(),
        content: m.content().to_string(),
        tool_call_id: m.tool_call_id().map(str::to_string),
    }));
    wire
}

/// Convert the provider's reply into an assistant message; content is never missing
pub fn from_wire_format(message: ResponseMessage) -> ChatMessage {
    ChatMessage::Assistant {
        content: message.content.unwrap_or_default(),
        tool_calls: message.tool_calls.filter(|calls| !calls.is_empty()),
    }
}
