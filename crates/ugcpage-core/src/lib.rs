//! ugcpage core - plumbing shared by the paging client
//!
//! Error taxonomy, blocking HTTP helpers, backoff/limit state and
//! logging setup. Nothing here knows about a specific API.

pub mod error;
pub mod http;
pub mod logging;
pub mod retry;
pub mod sleeper;

// Re-exports for convenience
pub use error::PagingError;
pub use http::{HttpConfig, HttpResponse, SHARED_RUNTIME, paging_client, send, token_client};
pub use logging::{TeeLogger, init_logging};
pub use retry::{AdaptiveLimit, BACKOFF_TIME_LIMIT, BackoffState, MAX_LIMIT, RetryPolicy};
pub use sleeper::{NoopSleeper, Sleeper, ThreadSleeper};
