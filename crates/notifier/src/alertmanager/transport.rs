//! HTTP transport with retry on transient failures.

use async_trait::async_trait;
use exponential_backoff::Backoff;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Performs a GET and returns the full response body.
///
/// Implementations own the retry policy: the fetcher makes exactly one call
/// and treats any error as terminal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Exponential backoff between attempts, capped at `max_backoff`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Total attempts, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delays to wait before each retry, doubling from `initial_backoff`.
    ///
    /// `Backoff` counts retries, not attempts, so the first try is excluded.
    pub fn backoff(&self) -> Backoff {
        let mut backoff = Backoff::new(
            self.attempts() - 1,
            self.initial_backoff,
            Some(self.max_backoff),
        );
        backoff.set_factor(2);
        backoff.set_jitter(0.0);
        backoff
    }
}

enum AttemptError {
    Retryable(String),
    Fatal(String),
}

pub struct RetryingTransport {
    client: Client,
    policy: RetryPolicy,
}

impl RetryingTransport {
    pub fn new(policy: RetryPolicy, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, policy))
    }

    pub fn with_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn attempt(&self, url: &str) -> std::result::Result<Vec<u8>, AttemptError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_builder() {
                AttemptError::Fatal(e.to_string())
            } else {
                AttemptError::Retryable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("GET {} returned {}", url, status);
            return Err(if is_retryable_status(status) {
                AttemptError::Retryable(message)
            } else {
                AttemptError::Fatal(message)
            });
        }

        // Reading the body consumes the response.
        let body = response
            .bytes()
            .await
            .map_err(|e| AttemptError::Retryable(format!("Failed to read response body: {}", e)))?;
        Ok(body.to_vec())
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl Transport for RetryingTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let max_attempts = self.policy.attempts();
        let backoff = self.policy.backoff();
        let mut attempt = 1;

        loop {
            debug!(%url, attempt, "sending request");
            match self.attempt(url).await {
                Ok(body) => return Ok(body),
                Err(AttemptError::Fatal(message)) => return Err(Error::Transport(message)),
                Err(AttemptError::Retryable(message)) => {
                    let delay = if attempt < max_attempts {
                        backoff.next(attempt - 1)
                    } else {
                        None
                    };
                    let Some(delay) = delay else {
                        return Err(Error::Transport(format!(
                            "giving up after {} attempts: {}",
                            attempt, message
                        )));
                    };
                    warn!(%url, attempt, ?delay, error = %message, "request failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
