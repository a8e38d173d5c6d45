use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use todoflow_core::{StepExecutor, StepFailure, StepOptions, StepResult};
use tokio::time::Instant;

fn options(max_attempts: u32) -> StepOptions {
    StepOptions {
        max_attempts,
        timeout_ms: 1_000,
        initial_backoff_ms: 100,
        backoff_multiplier: 2.0,
        max_backoff_ms: 150,
    }
}

#[tokio::test(start_paused = true)]
async fn success_runs_once() {
    let calls = Arc::new(AtomicU32::new(0));
    let executor = StepExecutor::new(options(3));

    let res = executor
        .run("ok", || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, StepFailure>("value")
            }
        })
        .await;

    assert_eq!(res, Ok("value"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn non_retryable_failure_is_never_reattempted() {
    let calls = Arc::new(AtomicU32::new(0));
    let executor = StepExecutor::new(options(5));

    let res: StepResult<()> = executor
        .run("chat", || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StepFailure::non_retryable("Error OpenAI chat: bad request"))
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let failure = res.unwrap_err();
    assert!(!failure.is_retryable());
    assert_eq!(failure.to_string(), "Error OpenAI chat: bad request");
}

#[tokio::test(start_paused = true)]
async fn retryable_failure_is_retried_until_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let executor = StepExecutor::new(options(3));
    let started = Instant::now();

    let res = executor
        .run("flaky", || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(StepFailure::retryable(format!("attempt {n} failed")))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

    assert_eq!(res, Ok(3));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // 100ms, then 200ms capped at 150ms
    assert!(started.elapsed() >= Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn retryable_failure_stops_after_max_attempts() {
    let calls = Arc::new(AtomicU32::new(0));
    let executor = StepExecutor::new(options(2));

    let res: StepResult<()> = executor
        .run("always_fails", || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Err(StepFailure::retryable(format!("attempt {n}")))
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(res.unwrap_err().message, "attempt 2");
}

#[tokio::test(start_paused = true)]
async fn timeout_counts_as_retryable_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let executor = StepExecutor::new(options(2));

    let res: StepResult<()> = executor
        .run("slow", || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let failure = res.unwrap_err();
    assert!(failure.is_retryable());
    assert_eq!(failure.message, "step slow timed out after 1000ms");
}

#[tokio::test(start_paused = true)]
async fn zero_max_attempts_still_runs_once() {
    let calls = Arc::new(AtomicU32::new(0));
    let executor = StepExecutor::new(options(0));

    let res: StepResult<()> = executor
        .run("once", || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StepFailure::retryable("nope"))
            }
        })
        .await;

    assert!(res.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn default_options() {
    let opts = StepOptions::default();
    assert_eq!(opts.max_attempts, 3);
    assert_eq!(opts.timeout_ms, 60_000);
    assert_eq!(StepExecutor::default().options(), &opts);
}
