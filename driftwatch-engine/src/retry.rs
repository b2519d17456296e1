//! Timeout and retry policy for upstream calls
//!
//! Transient failures are retried with exponential backoff; anything else
//! is returned immediately.

use std::future::Future;
use std::time::Duration;

use anyhow::{Result, anyhow};
use driftwatch_client::ClientError;
use tokio::time;
use tracing::warn;

use crate::config::EngineConfig;

const INITIAL_DELAY_MS: u64 = 500;
const MAX_DELAY_MS: u64 = 8_000;

/// Timeout and backoff settings for one upstream call
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub call_timeout: Duration,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, call_timeout: Duration) -> Self {
        Self {
            max_retries,
            call_timeout,
            initial_delay: Duration::from_millis(INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(MAX_DELAY_MS),
        }
    }

    /// Runs `op`, retrying transient failures
    ///
    /// # Arguments
    /// * `what` - Description of the call used in logs and errors
    /// * `op` - Produces a fresh request future for every attempt
    pub async fn call<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = driftwatch_client::Result<T>>,
    {
        let mut attempt = 0;
        let mut delay = self.initial_delay;

        loop {
            attempt += 1;

            let error = match time::timeout(self.call_timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if !e.is_transient() => {
                    return Err(anyhow::Error::from(e).context(format!("{} failed", what)));
                }
                Ok(Err(e)) => anyhow::Error::from(e),
                Err(_) => anyhow!("timed out after {:?}", self.call_timeout),
            };

            if attempt > self.max_retries {
                return Err(error.context(format!("{} failed after {} attempt(s)", what, attempt)));
            }

            warn!(
                "{} failed (attempt {}/{}): {:#}",
                what,
                attempt,
                self.max_retries + 1,
                error
            );
            warn!("Retrying in {:?}...", delay);

            time::sleep(delay).await;

            // Exponential backoff with cap
            delay = (delay * 2).min(self.max_delay);
        }
    }
}

impl From<&EngineConfig> for RetryPolicy {
    fn from(config: &EngineConfig) -> Self {
        Self::new(config.retries, config.call_timeout)
    }
}

/// Whether an error returned by [`RetryPolicy::call`] came from a non-retryable API answer
pub fn is_permanent(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ClientError>()
        .is_some_and(|e| !e.is_transient())
}
