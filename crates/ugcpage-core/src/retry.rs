//! Backoff and adaptive page-size state for the paging loop
//!
//! Both pieces of state move exactly one step per HTTP attempt:
//! a retryable failure doubles the backoff and halves the limit,
//! a success resets the backoff and doubles the limit.

use std::time::Duration;

/// Largest `limit` the collection endpoint accepts
pub const MAX_LIMIT: u32 = 100;

/// Backoff ceiling in seconds; a retryable failure at or past it is fatal
pub const BACKOFF_TIME_LIMIT: u64 = 256;

/// Which non-200 statuses are retried with backoff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Only 5xx responses are retried; other non-200s are fatal
    #[default]
    ServerErrors,
    /// Every non-200 response is retried
    AnyNonSuccess,
}

impl RetryPolicy {
    /// Parse CLI/config string into enum
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "server-errors" => Some(Self::ServerErrors),
            "any-non-success" => Some(Self::AnyNonSuccess),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ServerErrors => "server-errors",
            Self::AnyNonSuccess => "any-non-success",
        }
    }

    /// Whether a non-200, non-401 status should be retried
    pub fn is_retryable(self, status: u16) -> bool {
        match self {
            Self::ServerErrors => status >= 500,
            Self::AnyNonSuccess => status != 200,
        }
    }
}

impl std::fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Exponential backoff: `(seconds, retry_count)`, starting at `(1, 0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffState {
    seconds: u64,
    retries: u32,
}

impl Default for BackoffState {
    fn default() -> Self {
        Self::new()
    }
}

impl BackoffState {
    pub const fn new() -> Self {
        Self {
            seconds: 1,
            retries: 0,
        }
    }

    pub const fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Consecutive retries since the last success
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    /// True once another retry would exceed the ceiling
    pub const fn is_exhausted(&self) -> bool {
        self.seconds >= BACKOFF_TIME_LIMIT
    }

    /// Record a retryable failure and return how long to wait before retrying.
    ///
    /// The returned delay is the already-doubled backoff (2s, 4s, ... 256s).
    pub fn advance(&mut self) -> Duration {
        self.retries += 1;
        self.seconds = self.seconds.saturating_mul(2);
        Duration::from_secs(self.seconds)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Requested page size, shrunk on failure and grown on success.
///
/// Invariant: `1 <= current <= MAX_LIMIT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdaptiveLimit {
    current: u32,
    min_reached: u32,
}

impl Default for AdaptiveLimit {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveLimit {
    pub const fn new() -> Self {
        Self {
            current: MAX_LIMIT,
            min_reached: MAX_LIMIT,
        }
    }

    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Smallest limit used during the run
    pub const fn min_reached(&self) -> u32 {
        self.min_reached
    }

    /// Ceiling-halve after a retryable failure (never below 1)
    pub fn shrink(&mut self) -> u32 {
        self.current = self.current.div_ceil(2).max(1);
        self.min_reached = self.min_reached.min(self.current);
        self.current
    }

    /// Double after a success, capped at [`MAX_LIMIT`]
    pub fn grow(&mut self) -> u32 {
        self.current = self.current.saturating_mul(2).min(MAX_LIMIT);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_server_errors() {
        let p = RetryPolicy::ServerErrors;
        assert!(p.is_retryable(500));
        assert!(p.is_retryable(503));
        assert!(p.is_retryable(504));
        assert!(!p.is_retryable(400));
        assert!(!p.is_retryable(404));
        assert!(!p.is_retryable(429));
    }

    #[test]
    fn policy_any_non_success() {
        let p = RetryPolicy::AnyNonSuccess;
        assert!(p.is_retryable(400));
        assert!(p.is_retryable(429));
        assert!(p.is_retryable(504));
        assert!(!p.is_retryable(200));
    }

    #[test]
    fn policy_from_name() {
        assert_eq!(
            RetryPolicy::from_name("server-errors"),
            Some(RetryPolicy::ServerErrors)
        );
        assert_eq!(
            RetryPolicy::from_name("any-non-success"),
            Some(RetryPolicy::AnyNonSuccess)
        );
        assert_eq!(RetryPolicy::from_name("always"), None);
        assert_eq!(RetryPolicy::default(), RetryPolicy::ServerErrors);
    }

    #[test]
    fn backoff_doubles_until_exhausted() {
        let mut b = BackoffState::new();
        let mut delays = Vec::new();
        while !b.is_exhausted() {
            delays.push(b.advance().as_secs());
        }
        assert_eq!(delays, vec![2, 4, 8, 16, 32, 64, 128, 256]);
        assert_eq!(b.retries(), 8);
        assert_eq!(b.seconds(), BACKOFF_TIME_LIMIT);
    }

    #[test]
    fn backoff_reset() {
        let mut b = BackoffState::new();
        b.advance();
        b.advance();
        b.reset();
        assert_eq!(b, BackoffState::new());
        assert_eq!((b.seconds(), b.retries()), (1, 0));
    }

    #[test]
    fn limit_shrinks_with_ceiling_division() {
        let mut l = AdaptiveLimit::new();
        let seq: Vec<u32> = (0..8).map(|_| l.shrink()).collect();
        assert_eq!(seq, vec![50, 25, 13, 7, 4, 2, 1, 1]);
        assert_eq!(l.min_reached(), 1);
    }

    #[test]
    fn limit_grows_capped() {
        let mut l = AdaptiveLimit::new();
        l.shrink();
        l.shrink();
        l.shrink();
        assert_eq!(l.current(), 13);
        assert_eq!(l.grow(), 26);
        assert_eq!(l.grow(), 52);
        assert_eq!(l.grow(), MAX_LIMIT);
        assert_eq!(l.grow(), MAX_LIMIT);
        assert_eq!(l.min_reached(), 13);
    }

    #[test]
    fn limit_starts_at_max() {
        let l = AdaptiveLimit::default();
        assert_eq!(l.current(), MAX_LIMIT);
        assert_eq!(l.min_reached(), MAX_LIMIT);
    }
}
