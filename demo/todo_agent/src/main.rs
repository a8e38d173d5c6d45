mod config;
use config::TodoAgentConfig;
use std::sync::Arc;
use todoflow_core::{execute_todo_workflow, LlmChatStep, LocalSteps, StatusBook, StepExecutor};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logging / tracing
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,todoflow_core=info,todo_agent=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // Load configuration (defaults + env + optional TOML overlay)
    let cfg = TodoAgentConfig::load();
    info!(
        target: "todo_agent",
        todo_id = %cfg.todo.id,
        model = %cfg.todo.model,
        base_url = %cfg.llm.base_url,
        "Starting todo agent: LLM chat → settle → status"
    );

    let chat = LlmChatStep::from_config(cfg.llm.clone())?;
    let status = match &cfg.fallback_status {
        Some(s) => StatusBook::new().with_fallback(s.clone()),
        None => StatusBook::new(),
    };
    let steps = LocalSteps::new(chat, Arc::new(status), StepExecutor::new(cfg.step.clone()));

    match execute_todo_workflow(&steps, cfg.workflow_input()).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            error!(target: "todo_agent", error = %e, "Todo workflow failed");
            Err(e.into())
        }
    }
}
