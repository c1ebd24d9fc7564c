//! Run-scoped counters and the end-of-run report.
//!
//! `RunAggregates` is filled by the paging engine one attempt at a time and
//! handed back by value when the run ends; `RunReport` only formats it.

use std::time::Duration;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use ugcpage_core::MAX_LIMIT;

use crate::page::ChildCounts;
use crate::state::Endpoint;

/// Counters accumulated over a whole run
#[derive(Debug, Clone, PartialEq)]
pub struct RunAggregates {
    /// Completed HTTP attempts (successes, retried and fatal failures; never 401s)
    pub total_requests: u64,
    /// Pages successfully consumed
    pub pages: u64,
    /// Sum of the `count` field across pages
    pub total_ugc: u64,
    pub children: ChildCounts,
    /// Retryable failures that triggered a backoff
    pub timeout_count: u64,
    pub min_limit_reached: u32,
    /// Fastest / slowest successful page
    pub min_latency: Option<Duration>,
    pub max_latency: Option<Duration>,
    /// Time spent waiting on the network across all counted attempts
    pub total_wait: Duration,
}

impl Default for RunAggregates {
    fn default() -> Self {
        Self {
            total_requests: 0,
            pages: 0,
            total_ugc: 0,
            children: ChildCounts::default(),
            timeout_count: 0,
            min_limit_reached: MAX_LIMIT,
            min_latency: None,
            max_latency: None,
            total_wait: Duration::ZERO,
        }
    }
}

impl RunAggregates {
    /// Count a completed (non-401) attempt
    pub fn record_attempt(&mut self, latency: Duration) {
        self.total_requests += 1;
        self.total_wait += latency;
    }

    /// Fold a successful page into the totals
    pub fn record_page(&mut self, count: u64, children: &ChildCounts, latency: Duration) {
        self.pages += 1;
        self.total_ugc += count;
        self.children.add(children);
        self.min_latency = Some(self.min_latency.map_or(latency, |m| m.min(latency)));
        self.max_latency = Some(self.max_latency.map_or(latency, |m| m.max(latency)));
    }

    /// Mean wait per counted attempt
    pub fn average_latency(&self) -> Duration {
        match u32::try_from(self.total_requests) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_wait / n,
            Err(_) => Duration::from_secs_f64(
                self.total_wait.as_secs_f64() / self.total_requests as f64,
            ),
        }
    }

    /// Log the per-page counts and running totals after a successful page.
    pub fn log_page(&self, page_no: u64, endpoint: Endpoint, count: u64, page: &ChildCounts) {
        match endpoint {
            Endpoint::Reviews => {
                log::info!("PAGE {page_no} review count: {count}");
                log::info!("PAGE {page_no} image count: {}", page.images);
                log::info!("PAGE {page_no} video count: {}", page.videos);
                log::info!(
                    "PAGE {page_no} merchant response count: {}",
                    page.merchant_responses
                );
                log::info!("PAGE {page_no} Total image count: {}", self.children.images);
                log::info!("PAGE {page_no} Total video count: {}", self.children.videos);
                log::info!(
                    "PAGE {page_no} Total merchant response count: {}",
                    self.children.merchant_responses
                );
                log::info!("PAGE {page_no} Total review count: {}", self.total_ugc);
            }
            Endpoint::Questions => {
                log::info!("PAGE {page_no} question count: {count}");
                log::info!("PAGE {page_no} answer count: {}", page.answers);
                log::info!("PAGE {page_no} Total answer count: {}", self.children.answers);
                log::info!("PAGE {page_no} Total question count: {}", self.total_ugc);
            }
        }
    }
}

/// Aggregates plus the wall-clock length of the run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub endpoint: Endpoint,
    pub aggregates: RunAggregates,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn new(endpoint: Endpoint, aggregates: RunAggregates, elapsed: Duration) -> Self {
        Self {
            endpoint,
            aggregates,
            elapsed,
        }
    }

    /// Share of wall time spent waiting on the API, in percent
    pub fn wait_pct(&self) -> f64 {
        pct_f(self.aggregates.total_wait, self.elapsed)
    }

    /// Endpoint-specific totals as `(label, value)` rows
    fn totals(&self) -> Vec<(&'static str, u64)> {
        let a = &self.aggregates;
        match self.endpoint {
            Endpoint::Reviews => vec![
                ("Total image count", a.children.images),
                ("Total video count", a.children.videos),
                (
                    "Total merchant response count",
                    a.children.merchant_responses,
                ),
                ("Total review count", a.total_ugc),
            ],
            Endpoint::Questions => vec![
                ("Total answer count", a.children.answers),
                ("Total question count", a.total_ugc),
            ],
        }
    }

    /// Emit the summary through the log sink.
    pub fn log(&self) {
        let a = &self.aggregates;
        log::info!("Total time: {:.3}s", self.elapsed.as_secs_f64());
        log::info!(
            "Total time spent waiting for an API response: {:.3}s ({:.1}%)",
            a.total_wait.as_secs_f64(),
            self.wait_pct()
        );
        log::info!(
            "Average time per API request (including timeouts): {:.3}s",
            a.average_latency().as_secs_f64()
        );
        log::info!("Minimum response time: {}", fmt_latency(a.min_latency));
        log::info!("Maximum response time: {}", fmt_latency(a.max_latency));
        log::info!("Total requests made: {}", a.total_requests);
        log::info!("Total pages retrieved: {}", a.pages);
        for (label, value) in self.totals() {
            log::info!("{label}: {value}");
        }
        log::info!("Total timeouts: {}", a.timeout_count);
        log::info!(
            "Minimum limit param value reached on retries: {}",
            a.min_limit_reached
        );
    }

    /// Format summary table as a string.
    pub fn format_table(&self) -> String {
        let a = &self.aggregates;
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new(format!("Paging /v1/{}", self.endpoint))
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan),
            ]);

        table.add_row(vec![
            Cell::new("Elapsed"),
            Cell::new(format!("{:.1}s", self.elapsed.as_secs_f64())),
        ]);
        table.add_row(vec![
            Cell::new("Waiting on API"),
            Cell::new(format!(
                "{:.1}s ({:.1}%)",
                a.total_wait.as_secs_f64(),
                self.wait_pct()
            )),
        ]);
        table.add_row(vec![
            Cell::new("Latency avg / min / max"),
            Cell::new(format!(
                "{:.3}s / {} / {}",
                a.average_latency().as_secs_f64(),
                fmt_latency(a.min_latency),
                fmt_latency(a.max_latency)
            )),
        ]);
        table.add_row(vec![
            Cell::new("Requests"),
            Cell::new(fmt_num(a.total_requests)),
        ]);
        table.add_row(vec![Cell::new("Pages"), Cell::new(fmt_num(a.pages))]);
        for (label, value) in self.totals() {
            let label = label.trim_start_matches("Total ");
            table.add_row(vec![Cell::new(label), Cell::new(fmt_num(value))]);
        }
        let timeouts = Cell::new(fmt_num(a.timeout_count));
        table.add_row(vec![
            Cell::new("Timeouts"),
            if a.timeout_count > 0 {
                timeouts.fg(Color::Yellow)
            } else {
                timeouts
            },
        ]);
        table.add_row(vec![
            Cell::new("Min limit reached"),
            Cell::new(a.min_limit_reached.to_string()),
        ]);

        format!("\n{table}")
    }

    /// Print the table to stderr (TTY mode).
    pub fn print(&self) {
        eprintln!("{}", self.format_table());
    }
}

fn fmt_latency(d: Option<Duration>) -> String {
    d.map_or_else(|| "n/a".to_string(), |d| format!("{:.3}s", d.as_secs_f64()))
}

fn pct_f(part: Duration, whole: Duration) -> f64 {
    if whole.is_zero() {
        0.0
    } else {
        part.as_secs_f64() / whole.as_secs_f64() * 100.0
    }
}

/// Format number with thousand separators
pub fn fmt_num(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn default_min_limit_is_max() {
        let a = RunAggregates::default();
        assert_eq!(a.min_limit_reached, MAX_LIMIT);
        assert_eq!(a.min_latency, None);
        assert_eq!(a.average_latency(), Duration::ZERO);
    }

    #[test]
    fn record_page_tracks_min_max() {
        let mut a = RunAggregates::default();
        let children = ChildCounts {
            images: 2,
            ..Default::default()
        };
        for latency in [ms(300), ms(100), ms(200)] {
            a.record_attempt(latency);
            a.record_page(10, &children, latency);
        }
        assert_eq!(a.pages, 3);
        assert_eq!(a.total_ugc, 30);
        assert_eq!(a.children.images, 6);
        assert_eq!(a.min_latency, Some(ms(100)));
        assert_eq!(a.max_latency, Some(ms(300)));
        assert_eq!(a.total_wait, ms(600));
        assert_eq!(a.average_latency(), ms(200));
    }

    #[test]
    fn failed_attempts_count_as_requests_only() {
        let mut a = RunAggregates::default();
        a.record_attempt(ms(50));
        a.record_attempt(ms(150));
        assert_eq!(a.total_requests, 2);
        assert_eq!(a.pages, 0);
        assert_eq!(a.min_latency, None);
        assert_eq!(a.average_latency(), ms(100));
    }

    #[test]
    fn wait_pct() {
        let mut a = RunAggregates::default();
        a.record_attempt(Duration::from_secs(1));
        let report = RunReport::new(Endpoint::Reviews, a, Duration::from_secs(4));
        assert!((report.wait_pct() - 25.0).abs() < 1e-9);

        let empty = RunReport::new(Endpoint::Reviews, RunAggregates::default(), Duration::ZERO);
        assert_eq!(empty.wait_pct(), 0.0);
    }

    #[test]
    fn totals_per_endpoint() {
        let a = RunAggregates {
            total_ugc: 7,
            children: ChildCounts {
                images: 1,
                videos: 2,
                merchant_responses: 3,
                answers: 4,
            },
            ..Default::default()
        };
        let reviews = RunReport::new(Endpoint::Reviews, a.clone(), ms(10)).totals();
        assert_eq!(reviews.len(), 4);
        assert_eq!(reviews[3], ("Total review count", 7));

        let questions = RunReport::new(Endpoint::Questions, a, ms(10)).totals();
        assert_eq!(
            questions,
            vec![("Total answer count", 4), ("Total question count", 7)]
        );
    }

    #[test]
    fn table_mentions_endpoint_and_counts() {
        let a = RunAggregates {
            total_requests: 1234,
            pages: 12,
            ..Default::default()
        };
        let table = RunReport::new(Endpoint::Questions, a, ms(1500)).format_table();
        assert!(table.contains("/v1/questions"));
        assert!(table.contains("1,234"));
        assert!(table.contains("question count"));
        assert!(table.contains("n/a"));
    }

    #[test]
    fn fmt_num_separators() {
        assert_eq!(fmt_num(0), "0");
        assert_eq!(fmt_num(999), "999");
        assert_eq!(fmt_num(1000), "1,000");
        assert_eq!(fmt_num(262_144), "262,144");
        assert_eq!(fmt_num(1_234_567), "1,234,567");
    }
}
