//! Rate-limit bucket tracking the server's advertised window.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;

use crate::time::{Clock, SystemClock};

use super::HttpResponse;

/// Names of the rate-limit headers Discord sends.
pub mod header {
    /// Requests left in the current window.
    pub const REMAINING: &str = "x-ratelimit-remaining";
    /// Size of the window.
    pub const LIMIT: &str = "x-ratelimit-limit";
    /// Absolute reset time, Unix epoch seconds (fractional).
    pub const RESET: &str = "x-ratelimit-reset";
    /// Relative reset time in seconds (fractional). Preferred over [`RESET`].
    pub const RESET_AFTER: &str = "x-ratelimit-reset-after";
    /// Wait after a 429, as seconds or an HTTP-date. Authoritative when present.
    pub const RETRY_AFTER: &str = "retry-after";
}

/// Wait applied after a 429 that carries no usable retry hint.
pub const FALLBACK_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Shortest wait after a 429, so a zero hint cannot cause a resend storm.
pub const MIN_RETRY_AFTER: Duration = Duration::from_millis(100);

/// Longest wait the bucket will honor from a single response.
pub const MAX_RESET_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// A consistent copy of the bucket's state.
///
/// Invariant: `remaining <= limit` and `limit >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// Requests left before `reset_at`.
    pub remaining: u32,
    /// Requests allowed per window.
    pub limit: u32,
    /// When the window resets.
    pub reset_at: Instant,
}

impl RateLimitSnapshot {
    /// Returns true once the window has passed and the state must not be trusted.
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.reset_at
    }
}

/// Body of a Discord 429 response.
#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: Option<f64>,
}

/// Local view of one endpoint's rate limit.
///
/// Only the dispatcher mutates a bucket. Other threads read it through
/// [`RateLimitBucket::snapshot`] while holding the client's state lock.
#[derive(Debug)]
pub struct RateLimitBucket<C = SystemClock> {
    state: Option<RateLimitSnapshot>,
    clock: C,
}

impl RateLimitBucket<SystemClock> {
    /// Creates a bucket in the unknown state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: None,
            clock: SystemClock,
        }
    }
}

impl Default for RateLimitBucket<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RateLimitBucket<C> {
    /// Creates a bucket that resolves absolute reset timestamps with `clock`.
    #[must_use]
    pub const fn with_clock(clock: C) -> Self {
        Self { state: None, clock }
    }

    /// Returns a copy of the tracked state, or `None` while unknown.
    #[must_use]
    pub const fn snapshot(&self) -> Option<RateLimitSnapshot> {
        self.state
    }

    /// Returns true if a request may be sent right now.
    #[must_use]
    pub fn can_send_now(&self) -> bool {
        self.can_send_at(Instant::now())
    }

    /// Returns true if a request may be sent at `now`.
    ///
    /// Unknown or expired state is optimistic; the server's 429 is the backstop.
    #[must_use]
    pub fn can_send_at(&self, now: Instant) -> bool {
        self.state
            .is_none_or(|s| s.remaining > 0 || s.is_expired_at(now))
    }

    /// Returns how long until the current window resets.
    #[must_use]
    pub fn time_until_reset(&self) -> Duration {
        self.time_until_reset_at(Instant::now())
    }

    /// Returns how long after `now` the current window resets; zero when unknown.
    #[must_use]
    pub fn time_until_reset_at(&self, now: Instant) -> Duration {
        self.state
            .map_or(Duration::ZERO, |s| s.reset_at.saturating_duration_since(now))
    }

    /// Records the rate-limit information carried by a response.
    pub fn update(&mut self, response: &HttpResponse) {
        self.update_at(response, Instant::now());
    }

    /// Records the rate-limit information carried by a response received at `now`.
    ///
    /// A 429 zeroes `remaining` and resets after the server's retry hint,
    /// overriding every other header. Otherwise headers overwrite the
    /// matching fields; a response without any rate-limit header makes the
    /// state unknown again.
    pub fn update_at(&mut self, response: &HttpResponse, now: Instant) {
        if response.is_rate_limited() {
            let retry_after = self
                .retry_after(response)
                .unwrap_or(FALLBACK_RETRY_AFTER)
                .clamp(MIN_RETRY_AFTER, MAX_RESET_WAIT);
            let limit = parse_u32(response, header::LIMIT)
                .or_else(|| self.state.map(|s| s.limit))
                .unwrap_or(1)
                .max(1);
            self.state = Some(RateLimitSnapshot {
                remaining: 0,
                limit,
                reset_at: now + retry_after,
            });
            return;
        }

        let remaining = parse_u32(response, header::REMAINING);
        let limit = parse_u32(response, header::LIMIT);
        let reset_in = parse_secs(response, header::RESET_AFTER).or_else(|| {
            parse_f64(response, header::RESET).map(|epoch| self.clock.until_epoch_secs(epoch))
        });

        if remaining.is_none() && limit.is_none() && reset_in.is_none() {
            self.state = None;
            return;
        }

        let previous = self.state;
        let limit = limit
            .or_else(|| previous.map(|s| s.limit))
            .or(remaining)
            .unwrap_or(1)
            .max(1);
        let remaining = remaining
            .or_else(|| previous.map(|s| s.remaining))
            .unwrap_or(limit)
            .min(limit);
        let reset_at = reset_in.map_or_else(
            || previous.map_or(now, |s| s.reset_at),
            |wait| now + wait.min(MAX_RESET_WAIT),
        );

        self.state = Some(RateLimitSnapshot {
            remaining,
            limit,
            reset_at,
        });
    }

    /// Extracts the wait requested by a 429 response.
    ///
    /// `Retry-After` wins, then the JSON body's `retry_after`, then `X-RateLimit-Reset-After`.
    fn retry_after(&self, response: &HttpResponse) -> Option<Duration> {
        self.retry_after_header(response)
            .or_else(|| {
                serde_json::from_slice::<RateLimitBody>(&response.body)
                    .ok()
                    .and_then(|b| b.retry_after)
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            })
            .or_else(|| parse_secs(response, header::RESET_AFTER))
    }

    /// `Retry-After = HTTP-date / delay-seconds` (RFC 7231 section 7.1.3).
    fn retry_after_header(&self, response: &HttpResponse) -> Option<Duration> {
        let value = response.header_str(header::RETRY_AFTER)?;
        value
            .parse::<f64>()
            .ok()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .or_else(|| {
                httpdate::parse_http_date(value)
                    .ok()
                    .map(|date| self.clock.until(date))
            })
    }
}

fn parse_u32(response: &HttpResponse, name: &str) -> Option<u32> {
    response.header_str(name)?.parse().ok()
}

fn parse_f64(response: &HttpResponse, name: &str) -> Option<f64> {
    response.header_str(name)?.parse().ok()
}

fn parse_secs(response: &HttpResponse, name: &str) -> Option<Duration> {
    parse_f64(response, name).and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}
