use std::fs;
use std::path::Path;

use todoflow_core::llm::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use todoflow_core::{ChatMessage, ExecuteTodoInput, LlmClientConfig, StepOptions};

/// High-level configuration for the todo agent
#[derive(Clone, Debug)]
pub struct TodoAgentConfig {
    pub llm: LlmClientConfig,
    pub step: StepOptions,
    pub todo: TodoConfig,
    /// Status reported for todos nobody recorded; `None` makes the status step poll
    pub fallback_status: Option<String>,
}

/// The todo to execute and how to prompt for it
#[derive(Clone, Debug)]
pub struct TodoConfig {
    pub title: String,
    pub id: String,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            title: std::env::var("TODO_TITLE").unwrap_or_default(),
            id: std::env::var("TODO_ID").unwrap_or_default(),
            prompt: std::env::var("TODO_PROMPT").unwrap_or_default(),
            system_prompt: std::env::var("TODO_SYSTEM_PROMPT")
                .ok()
                .filter(|s| !s.is_empty()),
            model: std::env::var("TODO_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Default for TodoAgentConfig {
    fn default() -> Self {
        Self {
            llm: LlmClientConfig::default(),
            step: StepOptions::default(),
            todo: TodoConfig::default(),
            fallback_status: Some(
                std::env::var("TODO_FALLBACK_STATUS")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "completed".to_string()),
            ),
        }
    }
}

impl TodoAgentConfig {
    /// Load configuration from a TOML file (path via TODO_AGENT_CONFIG or ./todo_agent.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let path =
            std::env::var("TODO_AGENT_CONFIG").unwrap_or_else(|_| "todo_agent.toml".into());
        Self::load_from(Path::new(&path))
    }

    /// Like `load`, but from an explicit path. The step timeout is raised to at
    /// least the HTTP client timeout so a slow chat call is never re-sent.
    pub fn load_from(p: &Path) -> Self {
        Self::read_from(p).with_step_timeout_covering_client()
    }

    fn read_from(p: &Path) -> Self {
        let default = Self::default();
        if !p.exists() {
            tracing::info!(target: "todo_agent", path = %p.display(), "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match toml::from_str::<TodoAgentToml>(&s) {
                Ok(t) => t.overlay(default),
                Err(e) => {
                    tracing::warn!(target: "todo_agent", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "todo_agent", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    fn with_step_timeout_covering_client(mut self) -> Self {
        if self.step.timeout_ms < self.llm.request_timeout_ms {
            tracing::warn!(
                target: "todo_agent",
                step_timeout_ms = self.step.timeout_ms,
                request_timeout_ms = self.llm.request_timeout_ms,
                "step timeout below HTTP timeout; raising it"
            );
            self.step.timeout_ms = self.llm.request_timeout_ms;
        }
        self
    }

    /// Build the workflow input; the prompt becomes the single user message
    pub fn workflow_input(&self) -> ExecuteTodoInput {
        let mut messages = Vec::new();
        if !self.todo.prompt.is_empty() {
            messages.push(ChatMessage::user(self.todo.prompt.clone()));
        }
        let mut input =
            ExecuteTodoInput::new(self.todo.title.clone(), self.todo.id.clone(), messages);
        input.system_content = self.todo.system_prompt.clone();
        input.model = self.todo.model.clone();
        input.temperature = self.todo.temperature;
        input.max_tokens = self.todo.max_tokens;
        input
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct TodoAgentToml {
    pub fallback_status: Option<String>,
    pub llm: Option<LlmToml>,
    pub step: Option<StepToml>,
    pub todo: Option<TodoToml>,
}

impl TodoAgentToml {
    fn overlay(self, mut base: TodoAgentConfig) -> TodoAgentConfig {
        if let Some(s) = self.fallback_status {
            // an empty string turns the fallback off
            base.fallback_status = Some(s).filter(|s| !s.is_empty());
        }
        if let Some(l) = self.llm {
            l.apply(&mut base.llm);
        }
        if let Some(s) = self.step {
            s.apply(&mut base.step);
        }
        if let Some(t) = self.todo {
            t.apply(&mut base.todo);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct LlmToml {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub organization: Option<String>,
    pub request_timeout_ms: Option<u64>,
}
impl LlmToml {
    fn apply(self, l: &mut LlmClientConfig) {
        if let Some(x) = self.base_url {
            l.base_url = x;
        }
        if let Some(x) = self.api_key {
            l.api_key = Some(x);
        }
        if let Some(x) = self.organization {
            l.organization = Some(x);
        }
        if let Some(x) = self.request_timeout_ms {
            l.request_timeout_ms = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct StepToml {
    pub max_attempts: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub initial_backoff_ms: Option<u64>,
    pub backoff_multiplier: Option<f32>,
    pub max_backoff_ms: Option<u64>,
}
impl StepToml {
    fn apply(self, s: &mut StepOptions) {
        if let Some(x) = self.max_attempts {
            s.max_attempts = x.max(1);
        }
        if let Some(x) = self.timeout_ms {
            s.timeout_ms = x;
        }
        if let Some(x) = self.initial_backoff_ms {
            s.initial_backoff_ms = x;
        }
        if let Some(x) = self.backoff_multiplier {
            s.backoff_multiplier = x;
        }
        if let Some(x) = self.max_backoff_ms {
            s.max_backoff_ms = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct TodoToml {
    pub title: Option<String>,
    pub id: Option<String>,
    pub prompt: Option<String>,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}
impl TodoToml {
    fn apply(self, t: &mut TodoConfig) {
        if let Some(x) = self.title {
            t.title = x;
        }
        if let Some(x) = self.id {
            t.id = x;
        }
        if let Some(x) = self.prompt {
            t.prompt = x;
        }
        if let Some(x) = self.system_prompt {
            t.system_prompt = Some(x);
        }
        if let Some(x) = self.model {
            t.model = x;
        }
        if let Some(x) = self.temperature {
            t.temperature = x;
        }
        if let Some(x) = self.max_tokens {
            t.max_tokens = x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "TODO_TITLE",
            "TODO_ID",
            "TODO_PROMPT",
            "TODO_SYSTEM_PROMPT",
            "TODO_MODEL",
            "TODO_FALLBACK_STATUS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_match_chat_step_defaults() {
        clear_env();
        let cfg = TodoAgentConfig::default();
        assert_eq!(cfg.todo.model, "gpt-4");
        assert_eq!(cfg.todo.temperature, 0.2);
        assert_eq!(cfg.todo.max_tokens, 300);
        assert_eq!(cfg.fallback_status.as_deref(), Some("completed"));
        assert!(cfg.todo.title.is_empty());
    }

    #[test]
    #[serial]
    fn toml_overlays_defaults() {
        clear_env();
        let toml_src = r#"
            fallback_status = ""

            [llm]
            base_url = "http://localhost:9000/v1"
            request_timeout_ms = 1500

            [step]
            max_attempts = 0
            timeout_ms = 2500

            [todo]
            title = "Buy milk"
            id = "t1"
            prompt = "Plan my day"
            system_prompt = "Be brief"
            max_tokens = 64
        "#;
        let parsed: TodoAgentToml = toml::from_str(toml_src).unwrap();
        let cfg = parsed.overlay(TodoAgentConfig::default());

        assert_eq!(cfg.llm.base_url, "http://localhost:9000/v1");
        assert_eq!(cfg.llm.request_timeout_ms, 1500);
        assert_eq!(cfg.step.max_attempts, 1);
        assert_eq!(cfg.step.timeout_ms, 2500);
        assert_eq!(cfg.fallback_status, None);

        let input = cfg.workflow_input();
        assert_eq!(input.todo_title, "Buy milk");
        assert_eq!(input.todo_id, "t1");
        assert_eq!(input.messages, vec![ChatMessage::user("Plan my day")]);
        assert_eq!(input.system_content.as_deref(), Some("Be brief"));
        assert_eq!(input.max_tokens, 64);
        assert_eq!(input.model, "gpt-4");
    }

    #[test]
    #[serial]
    fn step_timeout_is_raised_to_client_timeout() {
        clear_env();
        let path = std::env::temp_dir().join(format!("todo_agent_{}.toml", std::process::id()));
        fs::write(
            &path,
            "[llm]\nrequest_timeout_ms = 30000\n\n[step]\ntimeout_ms = 5000\n",
        )
        .unwrap();

        let cfg = TodoAgentConfig::load_from(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(cfg.llm.request_timeout_ms, 30_000);
        assert_eq!(cfg.step.timeout_ms, 30_000);
    }

    #[test]
    #[serial]
    fn missing_file_keeps_defaults() {
        clear_env();
        std::env::set_var("TODO_TITLE", "From env");
        let cfg = TodoAgentConfig::load_from(Path::new("/nonexistent/todo_agent.toml"));
        assert_eq!(cfg.todo.title, "From env");
        assert!(cfg.workflow_input().messages.is_empty());
        std::env::remove_var("TODO_TITLE");
    }
}
