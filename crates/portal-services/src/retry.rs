//! Retry policy for football-data requests.
//!
//! Any non-success status is retried, and so is any transport error:
//! - 429 pauses before the next attempt
//! - other statuses go again straight away
//! - transport errors pause briefly and surface once attempts run out
//!
//! The first attempt gets a short timeout, later ones a longer one.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use thiserror::Error;

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_FIRST_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_RETRY_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_RATE_LIMIT_PAUSE_MS: u64 = 1000;
pub const DEFAULT_ERROR_PAUSE_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    pub first_timeout: Duration,
    pub retry_timeout: Duration,
    /// Pause after a 429
    pub rate_limit_pause: Duration,
    /// Pause after a transport error
    pub error_pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            first_timeout: Duration::from_secs(DEFAULT_FIRST_TIMEOUT_SECS),
            retry_timeout: Duration::from_secs(DEFAULT_RETRY_TIMEOUT_SECS),
            rate_limit_pause: Duration::from_millis(DEFAULT_RATE_LIMIT_PAUSE_MS),
            error_pause: Duration::from_millis(DEFAULT_ERROR_PAUSE_MS),
        }
    }
}

impl RetryPolicy {
    /// Request timeout for a 0-based attempt
    pub fn timeout_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            self.first_timeout
        } else {
            self.retry_timeout
        }
    }

    /// Same attempts and timeouts, no sleeping between them
    pub fn without_pauses(self) -> Self {
        Self {
            rate_limit_pause: Duration::ZERO,
            error_pause: Duration::ZERO,
            ..self
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

#[derive(Debug, Error)]
pub enum RetryError {
    #[error("upstream returned {status} on all {attempts} attempts")]
    Status { status: StatusCode, attempts: u32 },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl RetryError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RetryError::Status { status, .. } => Some(*status),
            RetryError::Transport(e) => e.status(),
        }
    }
}

/// Runs `operation` until it yields a success status or the policy is spent.
///
/// The closure receives the timeout to put on that attempt's request.
///
/// ```ignore
/// let response = with_retry(&RetryPolicy::default(), |timeout| {
///     client.get(url.clone()).timeout(timeout).send()
/// })
/// .await?;
/// ```
pub async fn with_retry<F, Fut>(policy: &RetryPolicy, operation: F) -> Result<Response, RetryError>
where
    F: Fn(Duration) -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut last_status = StatusCode::SERVICE_UNAVAILABLE;

    for attempt in 0..=policy.max_retries {
        match operation(policy.timeout_for_attempt(attempt)).await {
            Ok(response) if response.status().is_success() => {
                if attempt > 0 {
                    tracing::info!("Request succeeded after {} retries", attempt);
                }
                return Ok(response);
            }
            Ok(response) => {
                last_status = response.status();
                if last_status == StatusCode::TOO_MANY_REQUESTS {
                    tracing::warn!(
                        "Rate limited on attempt {} of {}",
                        attempt + 1,
                        policy.total_attempts()
                    );
                    tokio::time::sleep(policy.rate_limit_pause).await;
                } else {
                    tracing::error!("API error {}", last_status);
                }
            }
            Err(e) => {
                if attempt == policy.max_retries {
                    tracing::error!("All {} attempts failed: {}", policy.total_attempts(), e);
                    return Err(e.into());
                }
                tracing::warn!(
                    "Request error on attempt {} of {}: {}",
                    attempt + 1,
                    policy.total_attempts(),
                    e
                );
                tokio::time::sleep(policy.error_pause).await;
            }
        }
    }

    Err(RetryError::Status {
        status: last_status,
        attempts: policy.total_attempts(),
    })
}
