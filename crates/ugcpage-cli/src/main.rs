//! ugcpage - page through Enterprise API reviews or questions
//!
//! Authenticates with client credentials, walks every page of the selected
//! collection with adaptive page size and backoff, and logs aggregate
//! counts and timings to the console and a per-run log file.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::Log as _;
use ugcpage_core::{HttpConfig, PagingError};
use ugcpage_eapi::{Endpoint, Environment, RunArgs, RunReport, parse_param};

mod config;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "ugcpage")]
#[command(about = "Page through Enterprise API reviews or questions and report totals")]
#[command(version)]
struct Cli {
    /// OAuth2 client id (or UGCPAGE_CLIENT_ID / [credentials] in the config file)
    #[arg(long = "client_id")]
    client_id: Option<String>,

    /// OAuth2 client secret (or UGCPAGE_CLIENT_SECRET / [credentials])
    #[arg(long = "client_secret")]
    client_secret: Option<String>,

    /// Collection to page: reviews or questions (anything else means reviews)
    #[arg(long, default_value = "reviews")]
    endpoint: String,

    /// Maximum pages to fetch; values below 1 or non-numbers mean 1
    #[arg(long = "max_pages", default_value = "1", allow_hyphen_values = true)]
    max_pages: String,

    /// Environment: dev, qa or prod (anything else means dev)
    #[arg(long, default_value = "dev")]
    env: String,

    /// Page until the cursor runs out (up to 262144 pages), ignoring --max_pages
    #[arg(long = "all_pages")]
    all_pages: bool,

    /// Statuses retried with backoff: server-errors or any-non-success
    #[arg(long = "retry_policy")]
    retry_policy: Option<String>,

    /// Extra query filter sent with every request (repeatable), e.g. locale=en_US
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Config file path (default: ./ugcpage.toml or ~/.config/ugcpage/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the per-run log file
    #[arg(long = "log_dir")]
    log_dir: Option<PathBuf>,

    /// Log to the console only
    #[arg(long = "no_log_file")]
    no_log_file: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Show the effective configuration and exit
    #[arg(long = "show_config")]
    show_config: bool,
}

impl Cli {
    /// Merge flags over file config: CLI wins, then the file, then env defaults.
    fn run_args(&self, config: &Config) -> RunArgs {
        let mut params = config.query_params();
        params.extend(self.params.iter().cloned());
        RunArgs {
            client_id: self
                .client_id
                .clone()
                .or_else(|| config.credentials.client_id.clone())
                .unwrap_or_default(),
            client_secret: self
                .client_secret
                .clone()
                .or_else(|| config.credentials.client_secret.clone())
                .unwrap_or_default(),
            endpoint: Some(self.endpoint.clone()),
            env: Some(self.env.clone()),
            max_pages: Some(self.max_pages.clone()),
            unbounded: self.all_pages || config.paging.unbounded,
            retry_policy: self
                .retry_policy
                .clone()
                .or_else(|| config.paging.retry_policy.clone()),
            domain: Some(config.api.domain.clone()),
            params,
            http: HttpConfig {
                connect_timeout: Duration::from_secs(config.api.connect_timeout),
                request_timeout: Duration::from_secs(config.api.request_timeout),
            },
        }
    }

    fn log_path(&self, config: &Config, client_id: &str) -> Option<PathBuf> {
        if self.no_log_file || !config.logging.file {
            return None;
        }
        let dir = self.log_dir.clone().unwrap_or_else(|| config.logging.dir.clone());
        let env = Environment::from_name(&self.env).unwrap_or_default();
        let endpoint = Endpoint::from_name(&self.endpoint).unwrap_or_default();
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Some(dir.join(log_file_name(env, endpoint, client_id, nanos)))
    }
}

/// `ugcpage__{env}_{endpoint}_{client_id}_{unix_nanos}.log`
fn log_file_name(env: Environment, endpoint: Endpoint, client_id: &str, nanos: i64) -> String {
    let client: String = client_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("ugcpage__{env}_{endpoint}_{client}_{nanos}.log")
}

/// Config errors exit with 2, everything else with 1
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<PagingError>() {
        Some(PagingError::Config(_)) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn show_config(cli: &Cli, config: &Config) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let args = cli.run_args(config);
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let source = config
        .source
        .as_ref()
        .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
    table.add_row(vec!["Config file", source.as_str()]);
    table.add_row(vec!["Domain", config.api.domain.as_str()]);
    table.add_row(vec!["Environment", cli.env.as_str()]);
    table.add_row(vec!["Endpoint", cli.endpoint.as_str()]);
    table.add_row(vec![
        "Client id",
        if args.client_id.is_empty() {
            "not set"
        } else {
            args.client_id.as_str()
        },
    ]);
    table.add_row(vec![
        "Client secret",
        if args.client_secret.is_empty() {
            "not set"
        } else {
            "configured"
        },
    ]);
    let pages = if args.unbounded {
        "all".to_string()
    } else {
        cli.max_pages.clone()
    };
    table.add_row(vec!["Max pages", pages.as_str()]);
    table.add_row(vec![
        "Retry policy",
        args.retry_policy.as_deref().unwrap_or("server-errors"),
    ]);
    let timeouts = format!(
        "connect {}s, request {}s",
        config.api.connect_timeout, config.api.request_timeout
    );
    table.add_row(vec!["Timeouts", timeouts.as_str()]);
    let params = args
        .params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ");
    table.add_row(vec!["Extra params", params.as_str()]);

    eprintln!("\n{table}");
}

fn execute(args: RunArgs) -> Result<RunReport> {
    let config = ugcpage_eapi::Config::try_from(args)?;
    ugcpage_eapi::run(&config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };

    if cli.show_config {
        show_config(&cli, &config);
        return ExitCode::SUCCESS;
    }

    let args = cli.run_args(&config);
    let log_path = cli.log_path(&config, &args.client_id);
    if let Err(e) = ugcpage_core::init_logging(cli.debug, log_path.as_deref()) {
        eprintln!("error: cannot initialize logging: {e}");
        return ExitCode::FAILURE;
    }
    if let Some(path) = &config.source {
        log::info!("Loaded config from {}", path.display());
    }
    if let Some(path) = &log_path {
        log::debug!("Logging to {}", path.display());
    }

    match execute(args) {
        Ok(report) => {
            report.log();
            if std::io::stderr().is_terminal() {
                report.print();
            }
            log::logger().flush();
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:#}");
            log::logger().flush();
            exit_code(&e)
        }
    }
}
