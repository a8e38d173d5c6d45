use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::failure::{StepFailure, StepResult};

/// Retry and timeout policy applied to every step the executor runs.
///
/// A timed-out attempt is retried, so `timeout_ms` should not be shorter than
/// any timeout the step applies itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepOptions {
    pub max_attempts: u32,
    pub timeout_ms: u64,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f32,
    pub max_backoff_ms: u64,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_ms: 60_000,
            initial_backoff_ms: 500,
            backoff_multiplier: 2.0,
            max_backoff_ms: 10_000,
        }
    }
}

/// Runs steps with a per-attempt timeout, retrying only retryable failures
#[derive(Debug, Clone, Default)]
pub struct StepExecutor {
    options: StepOptions,
}

impl StepExecutor {
    pub fn new(options: StepOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &StepOptions {
        &self.options
    }

    /// Run `step` until it succeeds, fails non-retryably, or attempts run out.
    ///
    /// A timed-out attempt counts as a retryable failure. `step` is called once
    /// per attempt so each attempt gets a fresh future.
    #[tracing::instrument(skip(self, step), fields(max_attempts = self.options.max_attempts))]
    pub async fn run<T, F, Fut>(&self, name: &str, mut step: F) -> StepResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StepResult<T>>,
    {
        let max_attempts = self.options.max_attempts.max(1);
        let limit = Duration::from_millis(self.options.timeout_ms);
        let mut backoff = Duration::from_millis(self.options.initial_backoff_ms);
        let mut attempt = 1;

        loop {
            let started = Instant::now();
            debug!(target: "step", step = %name, attempt, "Running step");

            let failure = match timeout(limit, step()).await {
                Ok(Ok(value)) => {
                    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                    info!(target: "step", step = %name, attempt, latency_ms = elapsed_ms, "Step completed");
                    return Ok(value);
                }
                Ok(Err(failure)) => failure,
                Err(_) => StepFailure::retryable(format!(
                    "step {} timed out after {}ms",
                    name, self.options.timeout_ms
                )),
            };

            if !failure.is_retryable() {
                warn!(target: "step", step = %name, attempt, error = %failure, "Step failed (non-retryable)");
                return Err(failure);
            }
            if attempt >= max_attempts {
                warn!(target: "step", step = %name, attempt, error = %failure, "Step failed; attempts exhausted");
                return Err(failure);
            }

            warn!(
                target: "step",
                step = %name,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                error = %failure,
                "Step failed; retrying"
            );
            sleep(backoff).await;
            backoff = self.next_backoff(backoff);
            attempt += 1;
        }
    }

    fn next_backoff(&self, current: Duration) -> Duration {
        let cap = self.options.max_backoff_ms as f32 / 1000.0;
        let grown = current.as_secs_f32() * self.options.backoff_multiplier;
        if grown.is_nan() {
            return current;
        }
        Duration::from_secs_f32(grown.clamp(0.0, cap))
    }
}
