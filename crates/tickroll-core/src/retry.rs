//! Bounded retry policy for ingestion calls.

use std::time::Duration;

use crate::data_source::SourceError;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed(Duration),
    /// `base * 2^retry`, capped at `max`. With `jitter`, the delay is drawn
    /// uniformly from the upper half of that value.
    Exponential {
        base: Duration,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(250),
            max: Duration::from_secs(4),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `retry` (0-based).
    pub fn delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed(delay) => delay,
            Self::Exponential { base, max, jitter } => {
                let doubled = 1_u32
                    .checked_shl(retry)
                    .and_then(|factor| base.checked_mul(factor))
                    .unwrap_or(max);
                let capped = doubled.min(max);
                if !jitter {
                    return capped;
                }

                let ceiling = u64::try_from(capped.as_millis()).unwrap_or(u64::MAX);
                Duration::from_millis(fastrand::u64(ceiling / 2..=ceiling))
            }
        }
    }
}

/// How many times, and after how long, a failed fetch is attempted again.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts are `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed(delay),
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Statuses worth another attempt: throttling and transient server faults.
    pub const fn is_retryable_status(status: u16) -> bool {
        matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
    }

    /// The delay before retry number `retry`, or `None` once the budget is spent
    /// or `error` is permanent.
    pub fn next_delay(&self, retry: u32, error: &SourceError) -> Option<Duration> {
        (error.retryable() && retry < self.max_retries).then(|| self.backoff.delay(retry))
    }
}
