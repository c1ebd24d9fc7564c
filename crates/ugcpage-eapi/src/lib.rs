//! ugcpage EAPI - Enterprise API review/question pager
//!
//! Authenticates with client credentials, walks the cursor-paged
//! `/v1/reviews` or `/v1/questions` collection with adaptive page size
//! and backoff, and reports aggregate counts and timings.

pub mod api;
pub mod auth;
pub mod config;
pub mod engine;
pub mod page;
pub mod runner;
pub mod state;
pub mod stats;

#[cfg(test)]
mod testing;

// Re-exports
pub use api::{EapiClient, Gateway};
pub use auth::{AccessToken, OAuthTokenProvider, TokenSource};
pub use config::{Config, Credentials, RunArgs, parse_param};
pub use engine::{AttemptOutcome, PagingEngine};
pub use page::{ChildCounts, PageResult, child_ugc_counts};
pub use runner::run;
pub use state::{Endpoint, Environment, PageBudget};
pub use stats::{RunAggregates, RunReport};
