use clap::Args;

use crate::retry::{DEFAULT_BACKOFF, DEFAULT_MAX_RETRIES};

/// Retry behaviour of asset creation and ownership transfer.
#[derive(Debug, Clone, Args)]
pub struct RetryCliArgs {
    #[arg(env = "POD_PUBLISHING_MAX_RETRIES", long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    #[arg(env = "POD_PUBLISHING_RETRY_BACKOFF_SECS", long, default_value_t = DEFAULT_BACKOFF.as_secs())]
    pub retry_backoff_secs: u64,

    /// Retry until the registry accepts, ignoring --max-retries
    #[arg(env = "POD_PUBLISHING_UNBOUNDED_RETRY", long)]
    pub unbounded_retry: bool,
}
