use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use assert_matches::assert_matches;
use pod_publishing_registry_client_interface::RegistryError;
use tokio::time::Instant;
use tracing_test::traced_test;

use crate::retry::{retry, RetryPolicy};

/// Fails with `error` for the first `failures` calls, then succeeds with the attempt number.
async fn flaky(attempts: &AtomicU32, failures: u32, error: fn() -> RegistryError) -> Result<u32, RegistryError> {
    let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
    if attempt <= failures {
        Err(error())
    } else {
        Ok(attempt)
    }
}

/// The paused clock only moves when every task sleeps, so elapsed time is the sum of the backoffs.
fn assert_slept(start: Instant, secs: u64) {
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(secs), "slept {elapsed:?}, expected {secs}s");
    assert!(elapsed < Duration::from_secs(secs) + Duration::from_secs(1), "slept {elapsed:?}, expected {secs}s");
}

fn rejected() -> RegistryError {
    RegistryError::rejected("create_asset", "invalid nonce")
}

fn not_found() -> RegistryError {
    RegistryError::NotFound("did:nv:00".to_string())
}

#[tokio::test(start_paused = true)]
async fn succeeds_after_two_rejections_with_fixed_backoff() {
    let attempts = AtomicU32::new(0);
    let start = Instant::now();

    let result = retry(&RetryPolicy::default(), "create_asset", || flaky(&attempts, 2, rejected)).await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_slept(start, 60);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_the_retry_budget_without_a_final_sleep() {
    let attempts = AtomicU32::new(0);
    let start = Instant::now();

    let result = retry(&RetryPolicy::default(), "create_asset", || flaky(&attempts, 4, rejected)).await;

    assert_matches!(result, Err(RegistryError::Rejected { .. }));
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_slept(start, 90);
}

#[tokio::test(start_paused = true)]
async fn non_retryable_errors_fail_immediately() {
    let attempts = AtomicU32::new(0);
    let start = Instant::now();

    let result = retry(&RetryPolicy::default(), "resolve_workflow", || flaky(&attempts, 1, not_found)).await;

    assert_matches!(result, Err(RegistryError::NotFound(_)));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_slept(start, 0);
}

#[tokio::test(start_paused = true)]
async fn unbounded_policy_keeps_retrying() {
    let attempts = AtomicU32::new(0);
    let policy = RetryPolicy::unbounded(Duration::from_secs(10));
    let start = Instant::now();

    let result = retry(&policy, "create_asset", || flaky(&attempts, 25, rejected)).await;

    assert_eq!(result.unwrap(), 26);
    assert_slept(start, 250);
}

#[tokio::test(start_paused = true)]
async fn zero_retries_means_a_single_attempt() {
    let attempts = AtomicU32::new(0);
    let policy = RetryPolicy::bounded(0, Duration::from_secs(30));

    let result = retry(&policy, "transfer_ownership", || flaky(&attempts, 1, rejected)).await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn each_retry_is_logged() {
    let attempts = AtomicU32::new(0);

    retry(&RetryPolicy::default(), "create_asset", || flaky(&attempts, 1, rejected)).await.unwrap();

    assert!(logs_contain("Retrying create_asset"));
    assert!(logs_contain("retry=1"));
}

#[test]
fn default_policy_is_three_retries_thirty_seconds_apart() {
    assert_eq!(RetryPolicy::default(), RetryPolicy { max_retries: Some(3), backoff: Duration::from_secs(30) });
}
