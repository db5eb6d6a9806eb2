use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use pod_publishing_registry_client_interface::RegistryError;
use tracing::warn;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(30);

/// Fixed interval retry.
///
/// `max_retries: None` retries for as long as the error stays retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: Option<u32>,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::bounded(DEFAULT_MAX_RETRIES, DEFAULT_BACKOFF)
    }
}

impl RetryPolicy {
    pub fn bounded(max_retries: u32, backoff: Duration) -> Self {
        Self { max_retries: Some(max_retries), backoff }
    }

    pub fn unbounded(backoff: Duration) -> Self {
        Self { max_retries: None, backoff }
    }

    fn allows_retry(&self, retries: u32) -> bool {
        self.max_retries.map_or(true, |max| retries < max)
    }
}

pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for RegistryError {
    fn is_retryable(&self) -> bool {
        RegistryError::is_retryable(self)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error or the policy runs out of retries.
///
/// The last error is returned as is. No sleep follows the final attempt.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, step: &str, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut retries = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && policy.allows_retry(retries) => {
                retries += 1;
                warn!(
                    step,
                    retry = retries,
                    backoff_secs = policy.backoff.as_secs(),
                    error = %e,
                    "Retrying {}", step
                );
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
