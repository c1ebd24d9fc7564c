//! Logging to the console and a per-run log file

use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// ANSI color code and padded label for a log level.
fn level_style(level: log::Level, color: bool) -> (&'static str, &'static str, &'static str) {
    let label = match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    };
    if !color {
        return ("", label, "");
    }
    let ansi = match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug => "\x1b[36m",
        log::Level::Trace => "\x1b[35m",
    };
    (ansi, label, "\x1b[0m")
}

/// Logger that writes every accepted record to stderr and, optionally, a file.
///
/// Filtering is delegated to an `env_logger::Logger` so `RUST_LOG` works as usual.
/// Lines look like `2024-05-01 12:00:00.123 - INFO  - message`.
pub struct TeeLogger {
    inner: env_logger::Logger,
    file: Option<Mutex<LineWriter<File>>>,
    color: bool,
}

impl TeeLogger {
    pub fn new(inner: env_logger::Logger, file: Option<File>, color: bool) -> Self {
        Self {
            inner,
            file: file.map(|f| Mutex::new(LineWriter::new(f))),
            color,
        }
    }
}

impl log::Log for TeeLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        log::Log::enabled(&self.inner, metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.inner.matches(record) {
            return;
        }
        let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let (pre, label, post) = level_style(record.level(), self.color);
        eprintln!("{ts} - {pre}{label}{post} - {}", record.args());

        if let Some(file) = &self.file {
            if let Ok(mut w) = file.lock() {
                // A failed log write must not abort the run
                let _ = writeln!(w, "{ts} - {label} - {}", record.args());
            }
        }
    }

    fn flush(&self) {
        log::Log::flush(&self.inner);
        if let Some(file) = &self.file {
            if let Ok(mut w) = file.lock() {
                let _ = w.flush();
            }
        }
    }
}

/// Build the filtering logger: `RUST_LOG` wins, else info (debug with `debug`).
fn build_filter(debug: bool) -> env_logger::Logger {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .build()
}

/// Initialize global logging; creates (truncates) `log_file` when given.
pub fn init_logging(debug: bool, log_file: Option<&Path>) -> io::Result<()> {
    use std::io::IsTerminal;

    let file = log_file.map(File::create).transpose()?;
    let filter = build_filter(debug);
    let max_level = filter.filter();
    let color = io::stderr().is_terminal();

    log::set_boxed_logger(Box::new(TeeLogger::new(filter, file, color)))
        .map_err(io::Error::other)?;
    log::set_max_level(max_level);
    Ok(())
}
