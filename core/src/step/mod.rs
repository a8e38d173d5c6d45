//! Step host: failure classification, retrying executor, and the workflow's step interface

mod executor;
mod failure;
mod local;

pub use executor::{StepExecutor, StepOptions};
pub use failure::{StepFailure, StepResult};
pub use local::{LocalSteps, TodoSteps};
