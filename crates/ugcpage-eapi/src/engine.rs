//! Adaptive cursor-paging loop.
//!
//! Every HTTP attempt is classified into an [`AttemptOutcome`] and dispatched
//! in a fixed priority order: 401, retryable failure, fatal failure, success.
//! Only a success advances the page; 401s and retries re-issue the same page
//! with whatever limit the failed attempt left behind. Once backoff has
//! reached its ceiling, the next non-401 attempt ends the run whatever its
//! outcome.

use std::time::Duration;

use ugcpage_core::http::body_detail;
use ugcpage_core::{
    AdaptiveLimit, BACKOFF_TIME_LIMIT, BackoffState, HttpResponse, PagingError, RetryPolicy,
    Sleeper,
};

use crate::api::{Gateway, format_query};
use crate::auth::TokenSource;
use crate::page::{PageResult, child_ugc_counts};
use crate::state::{Endpoint, PageBudget};
use crate::stats::RunAggregates;

/// Result of one HTTP attempt against the collection endpoint
#[derive(Debug)]
pub enum AttemptOutcome {
    Success { page: PageResult, latency: Duration },
    Unauthorized,
    RetryableFailure { status: u16, latency: Duration },
    /// The client timeout fired before a response arrived; always retried
    TimedOut { latency: Duration },
    FatalFailure {
        status: u16,
        body: String,
        latency: Duration,
    },
}

impl AttemptOutcome {
    /// Classify a response; a 200 whose body does not decode is an error.
    pub fn classify(resp: HttpResponse, policy: RetryPolicy) -> Result<Self, PagingError> {
        let latency = resp.elapsed;
        Ok(match resp.status {
            401 => Self::Unauthorized,
            200 => Self::Success {
                page: PageResult::parse(&resp.body)?,
                latency,
            },
            status if policy.is_retryable(status) => Self::RetryableFailure { status, latency },
            status => Self::FatalFailure {
                status,
                body: body_detail(&resp.body),
                latency,
            },
        })
    }

    /// Classify a gateway result: timeouts become [`AttemptOutcome::TimedOut`],
    /// any other transport error is returned as is.
    pub fn from_attempt(
        attempt: Result<HttpResponse, PagingError>,
        policy: RetryPolicy,
    ) -> Result<Self, PagingError> {
        match attempt {
            Ok(resp) => Self::classify(resp, policy),
            Err(PagingError::Timeout { elapsed }) => Ok(Self::TimedOut { latency: elapsed }),
            Err(e) => Err(e),
        }
    }

    /// Wall-clock time of the attempt; `None` for a 401, which is not counted
    pub fn latency(&self) -> Option<Duration> {
        match self {
            Self::Unauthorized => None,
            Self::Success { latency, .. }
            | Self::RetryableFailure { latency, .. }
            | Self::TimedOut { latency }
            | Self::FatalFailure { latency, .. } => Some(*latency),
        }
    }

    /// HTTP status of the attempt; `None` when it timed out
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { .. } => Some(200),
            Self::Unauthorized => Some(401),
            Self::RetryableFailure { status, .. } | Self::FatalFailure { status, .. } => {
                Some(*status)
            }
            Self::TimedOut { .. } => None,
        }
    }
}

/// Query for one attempt: base parameters, then `limit`, then the cursor
pub fn build_query(
    base: &[(String, String)],
    limit: u32,
    cursor: Option<&str>,
) -> Vec<(String, String)> {
    let mut query = base.to_vec();
    if let Some(cursor) = cursor {
        query.push(("next_page".to_string(), cursor.to_string()));
    }
    query.push(("limit".to_string(), limit.to_string()));
    query
}

fn status_label(status: Option<u16>) -> String {
    status.map_or_else(|| "timeout".to_string(), |s| s.to_string())
}

/// Drives the paging state machine for one run.
pub struct PagingEngine<G, T, S> {
    gateway: G,
    tokens: T,
    sleeper: S,
    policy: RetryPolicy,
    endpoint: Endpoint,
}

impl<G: Gateway, T: TokenSource, S: Sleeper> PagingEngine<G, T, S> {
    pub fn new(gateway: G, tokens: T, sleeper: S, policy: RetryPolicy, endpoint: Endpoint) -> Self {
        Self {
            gateway,
            tokens,
            sleeper,
            policy,
            endpoint,
        }
    }

    /// Page through the collection until the cursor runs out or the budget
    /// is spent, returning the run's counters.
    pub fn run(
        &mut self,
        base_params: &[(String, String)],
        budget: PageBudget,
    ) -> Result<RunAggregates, PagingError> {
        let max_pages = budget.max_pages();
        let mut token = self.tokens.acquire()?;
        log::info!("Paging {} (max pages {max_pages})", self.gateway.url());

        let mut aggregates = RunAggregates::default();
        let mut limit = AdaptiveLimit::new();
        let mut backoff = BackoffState::new();
        let mut cursor: Option<String> = None;
        let mut page_no: u64 = 1;
        let mut complete = false;

        while page_no <= max_pages {
            let query = build_query(base_params, limit.current(), cursor.as_deref());
            log::info!(
                "PAGE {page_no} call url: {} with params {}",
                self.gateway.url(),
                format_query(&query)
            );
            let attempt = self.gateway.get_page(&query, &token);
            let outcome = AttemptOutcome::from_attempt(attempt, self.policy)?;
            let last_status = outcome.status();

            if let Some(latency) = outcome.latency() {
                aggregates.record_attempt(latency);
                if backoff.is_exhausted() {
                    log::error!(
                        "PAGE {page_no} status_code: {} - backoff time limit {BACKOFF_TIME_LIMIT}s reached",
                        status_label(last_status)
                    );
                    return Err(PagingError::BackoffExceeded {
                        limit_secs: BACKOFF_TIME_LIMIT,
                        last_status,
                    });
                }
            }

            match outcome {
                AttemptOutcome::Unauthorized => {
                    log::info!("PAGE {page_no} status_code: 401, refreshing token");
                    token = self.tokens.acquire()?;
                }
                AttemptOutcome::RetryableFailure { .. } | AttemptOutcome::TimedOut { .. } => {
                    let status = status_label(last_status);
                    aggregates.timeout_count += 1;
                    let delay = backoff.advance();
                    let next_limit = limit.shrink();
                    log::warn!(
                        "PAGE {page_no} - status_code: {status} retrying in {}s with limit {next_limit} | retry count {}",
                        delay.as_secs(),
                        backoff.retries()
                    );
                    self.sleeper.sleep(delay);
                }
                AttemptOutcome::FatalFailure { status, body, .. } => {
                    log::error!("PAGE {page_no} status_code: {status} body: {body}");
                    return Err(PagingError::Upstream { status, body });
                }
                AttemptOutcome::Success { page, latency } => {
                    log::info!("PAGE {page_no} status_code: 200");
                    backoff.reset();
                    limit.grow();

                    let children = child_ugc_counts(page.items());
                    aggregates.record_page(page.count, &children, latency);
                    aggregates.log_page(page_no, self.endpoint, page.count, &children);
                    log::info!(
                        "PAGE {page_no} time to complete response: {:.3}s",
                        latency.as_secs_f64()
                    );
                    page_no += 1;

                    match page.next_page {
                        Some(next) => cursor = Some(next),
                        None => {
                            log::info!("Completed paging after {} pages", aggregates.pages);
                            complete = true;
                            break;
                        }
                    }
                }
            }
        }

        if !complete {
            log::info!("Page budget of {max_pages} reached");
        }
        aggregates.min_limit_reached = limit.min_reached();
        Ok(aggregates)
    }
}
