//! Live test against the Enterprise API
//!
//! Requires network access and real credentials, so it is marked #[ignore].
//! Run with:
//!   UGCPAGE_CLIENT_ID=... UGCPAGE_CLIENT_SECRET=... \
//!     cargo test -p ugcpage-eapi --test live -- --ignored

use ugcpage_eapi::{Config, RunArgs};

#[test]
#[ignore]
fn fetch_first_review_page() {
    let _ = env_logger::builder().is_test(true).try_init();

    let args = RunArgs {
        client_id: std::env::var("UGCPAGE_CLIENT_ID").expect("UGCPAGE_CLIENT_ID not set"),
        client_secret: std::env::var("UGCPAGE_CLIENT_SECRET")
            .expect("UGCPAGE_CLIENT_SECRET not set"),
        env: std::env::var("UGCPAGE_ENV").ok(),
        max_pages: Some("2".to_string()),
        ..Default::default()
    };
    let config = Config::try_from(args).expect("valid config");

    let report = ugcpage_eapi::run(&config).expect("paging should succeed");
    let agg = &report.aggregates;

    assert!(agg.pages >= 1 && agg.pages <= 2);
    assert!(agg.total_requests >= agg.pages);
    assert!(agg.min_limit_reached >= 1);
    assert!(agg.min_latency <= agg.max_latency);
}
