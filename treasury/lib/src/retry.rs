//! Retry and backoff policy.
//!
//! An attempt is retried when it failed in transport, or when the response
//! status is 408, 409, 429 or >= 500. The server can override that decision
//! with `x-should-retry: true|false`. Between attempts the client sleeps
//! `initial_delay * e^attempt` (capped, with jitter) unless the server sent a
//! `Retry-After` header, which replaces the computed delay.

use std::time::Duration;

use rand::Rng;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Header the server uses to force or forbid a retry.
pub const SHOULD_RETRY_HEADER: &str = "x-should-retry";

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);
const DEFAULT_JITTER: Duration = Duration::from_millis(500);

/// Retry budget and backoff timing for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts is `max_retries + 1`.
    pub max_retries: u32,
    /// Base of the exponential backoff.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Maximum jitter added to or subtracted from computed delays.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter: DEFAULT_JITTER,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// A policy that retries without sleeping between attempts.
    ///
    /// `Retry-After` is still honored.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: DEFAULT_MAX_DELAY,
            jitter: Duration::ZERO,
        }
    }

    /// Returns a copy with a different retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns a copy with different delay bounds.
    pub fn with_delays(mut self, initial_delay: Duration, max_delay: Duration, jitter: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.max_delay = max_delay;
        self.jitter = jitter;
        self
    }

    /// Decides whether a completed response should be retried.
    ///
    /// `x-should-retry` wins over the status code in both directions.
    pub fn should_retry(&self, status: StatusCode, headers: &HeaderMap) -> bool {
        match headers
            .get(SHOULD_RETRY_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            Some("true") => return true,
            Some("false") => return false,
            _ => {}
        }

        matches!(
            status,
            StatusCode::REQUEST_TIMEOUT | StatusCode::CONFLICT | StatusCode::TOO_MANY_REQUESTS
        ) || status.is_server_error()
    }

    /// Computes the sleep before retry number `attempt + 1`.
    ///
    /// `attempt` is the zero-based index of the attempt that just failed.
    /// Pass an empty header map for transport failures.
    pub fn delay_for(&self, attempt: u32, headers: &HeaderMap) -> Duration {
        if let Some(retry_after) = retry_after(headers) {
            return retry_after.min(self.max_delay);
        }

        if self.initial_delay.is_zero() {
            return self.apply_jitter(Duration::ZERO);
        }
        let seconds = (self.initial_delay.as_secs_f64() * f64::from(attempt).exp())
            .min(self.max_delay.as_secs_f64());
        self.apply_jitter(Duration::from_secs_f64(seconds))
    }

    fn apply_jitter(&self, delay: Duration) -> Duration {
        if self.jitter.is_zero() {
            return delay;
        }
        let span = self.jitter.as_millis() as i64;
        let offset = rand::thread_rng().gen_range(-span..=span);
        if offset >= 0 {
            delay + Duration::from_millis(offset as u64)
        } else {
            delay.saturating_sub(Duration::from_millis(offset.unsigned_abs()))
        }
    }
}

/// Parses `Retry-After` as a number of seconds.
///
/// HTTP-date values, and values too large for a [`Duration`], are not
/// supported and fall back to exponential backoff.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let seconds: f64 = raw.parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}
