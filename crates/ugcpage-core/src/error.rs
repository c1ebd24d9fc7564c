//! Error taxonomy for a paging run

use std::time::Duration;

/// Fatal error from a paging run.
///
/// Transient upstream failures never surface here: they are absorbed by the
/// backoff loop and only escalate as [`PagingError::BackoffExceeded`].
#[derive(Debug)]
pub enum PagingError {
    /// Missing or invalid configuration, detected before any network call
    Config(String),
    /// Identity endpoint refused the credentials
    Auth { status: u16, body: String },
    /// Collection endpoint returned a non-retryable status
    Upstream { status: u16, body: String },
    /// Backoff reached its ceiling; `last_status` is `None` when the
    /// attempt that hit it timed out
    BackoffExceeded {
        limit_secs: u64,
        last_status: Option<u16>,
    },
    /// Request exceeded the client timeout
    Timeout { elapsed: Duration },
    /// Connection-level failure (DNS, TLS, reset)
    Transport(String),
    /// A 200 response whose body could not be decoded
    Decode(String),
}

impl std::fmt::Display for PagingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Auth { status, body } => write!(f, "auth failed (HTTP {status}): {body}"),
            Self::Upstream { status, body } => write!(f, "HTTP {status}: {body}"),
            Self::BackoffExceeded {
                limit_secs,
                last_status,
            } => match last_status {
                Some(status) => write!(
                    f,
                    "backoff time limit {limit_secs}s reached (last status {status})"
                ),
                None => write!(
                    f,
                    "backoff time limit {limit_secs}s reached (last attempt timed out)"
                ),
            },
            Self::Timeout { elapsed } => {
                write!(f, "request timed out after {:.1}s", elapsed.as_secs_f64())
            }
            Self::Transport(msg) => write!(f, "HTTP error: {msg}"),
            Self::Decode(msg) => write!(f, "invalid response body: {msg}"),
        }
    }
}

impl std::error::Error for PagingError {}

impl PagingError {
    /// Create a transport error from a reqwest error.
    ///
    /// The URL is stripped so query strings (cursors, filters) stay out of logs.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url().to_string())
    }
}
