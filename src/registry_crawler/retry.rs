use reqwest::{RequestBuilder, Response};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::RetryConfig;
use crate::models::Result;

/// Retry-with-backoff wrapper around request dispatch.
///
/// Transient failures (a configured status list plus transport errors) are
/// retried with exponential backoff. When the attempts run out the request's
/// branch is abandoned (`Ok(None)`), which the crawler logs but survives.
/// Any other non-success status is unexpected and comes back as an error.
pub struct RetryPolicy {
    enabled: bool,
    retry_times: u32,
    retry_http_codes: Vec<u16>,
    backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            enabled: config.enabled,
            retry_times: config.retry_times,
            retry_http_codes: config.retry_http_codes.clone(),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_http_codes.contains(&status)
    }

    /// Delay before the retry with the given zero-based index:
    /// `backoff_base * 2^retry_index`.
    pub fn backoff_delay(&self, retry_index: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(retry_index)
    }

    fn max_attempts(&self) -> u32 {
        if self.enabled {
            self.retry_times + 1
        } else {
            1
        }
    }

    /// Sends the request produced by `build`, retrying transient failures.
    /// `label` names the request in log lines.
    pub async fn send<F>(&self, label: &str, build: F) -> Result<Option<Response>>
    where
        F: Fn() -> RequestBuilder,
    {
        let max_attempts = self.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(Some(response));
                    }
                    if !self.is_retryable_status(status.as_u16()) {
                        return Err(format!(
                            "{} request failed with unexpected status {}",
                            label, status
                        )
                        .into());
                    }
                    warn!(
                        "{} request returned {} (attempt {}/{})",
                        label,
                        status,
                        attempt + 1,
                        max_attempts
                    );
                }
                Err(e) => {
                    warn!(
                        "{} request failed: {} (attempt {}/{})",
                        label,
                        e,
                        attempt + 1,
                        max_attempts
                    );
                }
            }

            attempt += 1;
            if attempt >= max_attempts {
                warn!("Gave up on {} after {} attempt(s)", label, attempt);
                return Ok(None);
            }

            let delay = self.backoff_delay(attempt - 1);
            info!("Retrying {} in {:.1} seconds...", label, delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
    }
}
