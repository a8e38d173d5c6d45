//! Functions executed as workflow steps besides the chat call

mod get_result;

pub use get_result::{GetResultInput, StatusBook, TodoStatus};
