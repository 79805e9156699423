use std::time::Duration;

const RETRY_DELAY_CAP_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Retry budget for GitHub API calls. A single attempt disables retries.
pub(crate) struct RetryPolicy {
    max_attempts: usize,
    base_delay_ms: u64,
}

impl RetryPolicy {
    pub(crate) fn new(max_attempts: usize, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms: base_delay_ms.max(1),
        }
    }

    pub(crate) fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub(crate) fn should_retry_status(&self, attempt: usize, status: u16) -> bool {
        attempt < self.max_attempts && (status == 429 || status >= 500)
    }

    pub(crate) fn should_retry_transport(&self, attempt: usize, error: &reqwest::Error) -> bool {
        attempt < self.max_attempts && (error.is_timeout() || error.is_connect())
    }

    /// Exponential back-off from the base delay, floored by `Retry-After` when present.
    pub(crate) fn delay(&self, attempt: usize, retry_after: Option<Duration>) -> Duration {
        if let Some(delay) = retry_after {
            return delay.max(Duration::from_millis(self.base_delay_ms));
        }
        let exponent = attempt.saturating_sub(1).min(10) as u32;
        let scaled = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(exponent));
        Duration::from_millis(scaled.min(RETRY_DELAY_CAP_MS))
    }
}

pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let raw = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?;
    raw.trim().parse::<u64>().ok().map(Duration::from_secs)
}

pub(crate) fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}
