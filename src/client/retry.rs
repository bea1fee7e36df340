//! Fixed-delay retry for transport failures.
//!
//! Only [`TransportError`]s are retried. A response with any status code
//! ends the loop immediately; callers decide what a non-2xx means.

use std::time::Duration;

use crate::client::transport::{HttpResponse, HttpTransport, TransportError};

/// How many times to attempt a request and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Treated as at least 1.
    pub attempts: u32,
    /// Sleep between two consecutive attempts (never after the last one).
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// POST `body` to `url`, retrying transport failures per this policy.
    ///
    /// `label` names the call in log lines (e.g. `"chat"`, `"tts"`).
    pub async fn post_json(
        &self,
        transport: &dyn HttpTransport,
        label: &str,
        url: &str,
        api_key: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            match transport.post_json(url, api_key, body, timeout).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt >= attempts => {
                    log::error!("{label}: request failed, {attempts} attempts used up: {e}");
                    return Err(e);
                }
                Err(e) => {
                    log::warn!("{label}: request failed, retry {attempt}/{attempts}: {e}");
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
