use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;

const RETRY_AFTER: &str = "Retry-After";
const RATE_LIMIT_RESET: &str = "X-RateLimit-Reset";
const RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";
const RATE_LIMIT_LIMIT: &str = "X-RateLimit-Limit";

/// GitHub answers an exhausted quota with 403, secondary limits with 429.
pub fn is_throttled(status: StatusCode) -> bool {
    status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

/// How long a throttled response asks us to back off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSignal {
    pub wait: Option<Duration>,
}

impl RateLimitSignal {
    /// Reads the wait from `Retry-After` (seconds) or, failing that, from
    /// `X-RateLimit-Reset` (Unix seconds) measured against `now`.
    ///
    /// A reset time already behind `now` gives a zero wait.
    pub fn from_headers(headers: &HeaderMap, now: DateTime<Utc>) -> Self {
        if let Some(secs) = header_u64(headers, RETRY_AFTER) {
            return RateLimitSignal {
                wait: Some(Duration::from_secs(secs)),
            };
        }

        let wait = header_u64(headers, RATE_LIMIT_RESET).map(|reset| {
            let now_secs = now.timestamp().max(0) as u64;
            Duration::from_secs(reset.saturating_sub(now_secs))
        });
        RateLimitSignal { wait }
    }

    /// The wait, if there is one and it fits under `ceiling`.
    pub fn admissible(&self, ceiling: Duration) -> Option<Duration> {
        self.wait.filter(|wait| *wait <= ceiling)
    }
}

/// Remaining quota as reported on every search response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub remaining: u64,
    pub limit: u64,
}

impl RateLimitStatus {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Some(RateLimitStatus {
            remaining: header_u64(headers, RATE_LIMIT_REMAINING)?,
            limit: header_u64(headers, RATE_LIMIT_LIMIT)?,
        })
    }

    pub fn percentage(&self) -> u64 {
        if self.limit > 0 {
            self.remaining.saturating_mul(100) / self.limit
        } else {
            100
        }
    }
}
