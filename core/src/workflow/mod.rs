//! Workflows sequencing steps

mod execute_todo;

pub use execute_todo::{
    execute_todo_workflow, ExecuteTodoInput, TodoExecutionResult, NO_DETAILS, STATUS_SETTLE_DELAY,
};
