//! Blocking HTTP on top of async reqwest.
//!
//! The paging loop is strictly sequential, so requests are driven to
//! completion on a shared current-thread runtime and exposed as plain
//! synchronous calls.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use crate::error::PagingError;

/// Connect timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Whole-request timeout; large pages on a struggling backend can be slow
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeouts applied to every client built here
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Client for the collection endpoint: a single kept-alive connection.
pub fn paging_client(config: &HttpConfig) -> Result<reqwest::Client, PagingError> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .pool_max_idle_per_host(1)
        .build()
        .map_err(PagingError::from_reqwest)
}

/// Client for token requests: no idle connections are kept.
pub fn token_client(config: &HttpConfig) -> Result<reqwest::Client, PagingError> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .pool_max_idle_per_host(0)
        .build()
        .map_err(PagingError::from_reqwest)
}

/// Fully read HTTP response with its wall-clock latency
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    pub elapsed: Duration,
}

/// Send a request and read the whole body, timing the exchange.
///
/// Non-2xx statuses are returned as responses, not errors. A request that
/// runs past the client timeout maps to [`PagingError::Timeout`]; other
/// connection-level failures map to [`PagingError::Transport`].
pub fn send(request: reqwest::RequestBuilder) -> Result<HttpResponse, PagingError> {
    SHARED_RUNTIME.block_on(async {
        let start = Instant::now();
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                PagingError::Timeout {
                    elapsed: start.elapsed(),
                }
            } else {
                PagingError::from_reqwest(e)
            }
        };
        let resp = request.send().await.map_err(map_err)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(map_err)?;
        Ok(HttpResponse {
            status,
            body,
            elapsed: start.elapsed(),
        })
    })
}

/// Render a response body for error messages.
pub fn body_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    trimmed.to_string()
}
