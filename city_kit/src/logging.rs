//! # Logging
//!
//! Global logger for the `log` facade, backed by `env_logger` writing to
//! stderr. Filter precedence: `GATE_LOG`, then `RUST_LOG`, then `warn`.
//!
//! Warnings and errors are counted so a run can end with a cargo-style
//! trailer via [`print_cargo_style_summary`].

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{Level, Log, Metadata, Record};
use thiserror::Error;

/// Filter variable that takes precedence over `RUST_LOG`
pub const LOG_ENV: &str = "GATE_LOG";

const DEFAULT_FILTER: &str = "warn";

static WARNINGS: AtomicUsize = AtomicUsize::new(0);
static ERRORS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

struct CountingLogger {
    inner: env_logger::Logger,
}

impl Log for CountingLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.inner.matches(record) {
            return;
        }
        match record.level() {
            Level::Error => {
                ERRORS.fetch_add(1, Ordering::Relaxed);
            }
            Level::Warn => {
                WARNINGS.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Filter directives from the environment, or the default
fn filter_from_env() -> String {
    [LOG_ENV, "RUST_LOG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global logger
///
/// Fails if a logger was already installed in this process.
pub fn init_global_logging() -> Result<(), LoggingError> {
    let inner = env_logger::Builder::new()
        .parse_filters(&filter_from_env())
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .build();

    let max_level = inner.filter();
    log::set_boxed_logger(Box::new(CountingLogger { inner }))?;
    log::set_max_level(max_level);
    Ok(())
}

/// Warnings and errors emitted so far
pub fn counts() -> (usize, usize) {
    (
        WARNINGS.load(Ordering::Relaxed),
        ERRORS.load(Ordering::Relaxed),
    )
}

/// Print `warning: ...` / `error: ...` trailers to stderr when anything was logged
pub fn print_cargo_style_summary() {
    let (warnings, errors) = counts();
    if warnings > 0 {
        eprintln!(
            "warning: gate emitted {} warning{}",
            warnings,
            if warnings == 1 { "" } else { "s" }
        );
    }
    if errors > 0 {
        eprintln!(
            "error: gate emitted {} error{}",
            errors,
            if errors == 1 { "" } else { "s" }
        );
    }
}
