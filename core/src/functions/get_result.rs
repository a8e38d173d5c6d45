use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::step::{StepFailure, StepResult};

/// Input of the `get_result` step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GetResultInput {
    pub todo_title: String,
    pub todo_id: String,
}

/// Status of a todo as seen by the status source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoStatus {
    pub todo_id: String,
    pub todo_title: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct StatusRecord {
    status: String,
    updated_at: DateTime<Utc>,
}

/// In-process status source keyed by todo id.
///
/// Writers on other tasks call `record` while a workflow is waiting; the
/// workflow reads through `get_result`.
#[derive(Debug, Default)]
pub struct StatusBook {
    records: DashMap<String, StatusRecord>,
    fallback_status: Option<String>,
}

impl StatusBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status reported for todos nobody has recorded yet
    pub fn with_fallback(mut self, status: impl Into<String>) -> Self {
        self.fallback_status = Some(status.into());
        self
    }

    /// Record (or overwrite) the status of a todo
    pub fn record(&self, todo_id: impl Into<String>, status: impl Into<String>) {
        let todo_id = todo_id.into();
        let status = status.into();
        info!(target: "status_book", todo_id = %todo_id, status = %status, "Recording todo status");
        self.records.insert(
            todo_id,
            StatusRecord {
                status,
                updated_at: Utc::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a todo's status.
    ///
    /// Unknown todos get the fallback status if one is configured, otherwise a
    /// retryable failure so the host polls again.
    pub async fn get_result(&self, input: GetResultInput) -> StepResult<TodoStatus> {
        if let Some(rec) = self.records.get(&input.todo_id) {
            debug!(target: "status_book", todo_id = %input.todo_id, status = %rec.status, "Status hit");
            return Ok(TodoStatus {
                todo_id: input.todo_id,
                todo_title: input.todo_title,
                status: rec.status.clone(),
                updated_at: Some(rec.updated_at),
            });
        }

        match &self.fallback_status {
            Some(status) => {
                debug!(target: "status_book", todo_id = %input.todo_id, status = %status, "Status miss; using fallback");
                Ok(TodoStatus {
                    todo_id: input.todo_id,
                    todo_title: input.todo_title,
                    status: status.clone(),
                    updated_at: None,
                })
            }
            None => Err(StepFailure::retryable(format!(
                "status for todo {} not available yet",
                input.todo_id
            ))),
        }
    }
}
