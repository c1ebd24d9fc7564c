//! Main execution logic for a paging run

use std::time::Instant;

use anyhow::Context;
use ugcpage_core::ThreadSleeper;

use crate::api::EapiClient;
use crate::auth::OAuthTokenProvider;
use crate::config::Config;
use crate::engine::PagingEngine;
use crate::stats::RunReport;

/// Acquire a token, page the configured collection and build the report.
///
/// Fatal paging errors are returned as-is (wrapped in `anyhow`) so callers
/// can downcast to [`ugcpage_core::PagingError`].
pub fn run(config: &Config) -> anyhow::Result<RunReport> {
    log::info!(
        "ugcpage starting: env={}, endpoint={}, client_id={}, max_pages={}, retry_policy={}",
        config.env,
        config.endpoint,
        config.credentials.client_id,
        config.budget.max_pages(),
        config.retry_policy
    );

    let tokens = OAuthTokenProvider::new(
        config.token_url(),
        config.credentials.clone(),
        &config.http,
    )
    .context("Failed to build token client")?;
    let gateway = EapiClient::new(config.collection_url(), &config.http)
        .context("Failed to build collection client")?;
    let mut engine = PagingEngine::new(
        gateway,
        tokens,
        ThreadSleeper,
        config.retry_policy,
        config.endpoint,
    );

    let start = Instant::now();
    let aggregates = engine.run(&config.params, config.budget)?;
    Ok(RunReport::new(config.endpoint, aggregates, start.elapsed()))
}
