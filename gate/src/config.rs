//! Configuration types for the gate CLI
//!
//! Defines the run configuration built from parsed arguments, plus the
//! duration and citizen resolution rules.

use std::path::PathBuf;
use std::time::Duration;

use city_kit::collectors::GitCollector;
use city_kit::execution_api::RunOptions;
use city_kit::ledger::UNKNOWN_CITIZEN;

/// Environment variable naming the acting citizen
pub const CITIZEN_ENV: &str = "POLIS_CITIZEN";

/// Output format for the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Colored console report
    Pretty,
    /// Pretty-printed JSON verdict
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Configuration for one `gate city` run
#[derive(Debug, Clone)]
pub struct CityConfig {
    /// Repository holding `city.toml`
    pub repo_path: PathBuf,

    /// Install location for the split check
    pub install_at: Option<PathBuf>,

    pub skip_standalone: bool,

    pub standalone_timeout: Duration,

    /// Console format
    pub output_format: OutputFormat,

    /// Additional JSON file (None means console-only output)
    pub output_file: Option<PathBuf>,

    /// `--citizen` value, resolved lazily
    pub citizen: Option<String>,

    /// Record the verdict in the ledger
    pub record: bool,
}

impl CityConfig {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            install_at: self.install_at.clone(),
            skip_standalone: self.skip_standalone,
            standalone_timeout: self.standalone_timeout,
            cancel: None,
        }
    }
}

/// Parse `<n>ms`, `<n>s`, `<n>m`, `<n>h` or a bare number of seconds
pub fn parse_duration_value(raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    let invalid = || format!("invalid duration {:?}: use a value like 120s", raw);

    let (digits, unit_ms): (&str, u64) = if let Some(n) = value.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = value.strip_suffix('m') {
        (n, 60_000)
    } else if let Some(n) = value.strip_suffix('h') {
        (n, 3_600_000)
    } else {
        (value, 1_000)
    };

    let amount: u64 = digits.trim().parse().map_err(|_| invalid())?;
    let millis = amount.checked_mul(unit_ms).ok_or_else(invalid)?;
    if millis == 0 {
        return Err(invalid());
    }
    Ok(Duration::from_millis(millis))
}

/// Flag, then `POLIS_CITIZEN`, then `git config user.name`, then `unknown`
pub fn resolve_citizen(flag: Option<&str>) -> String {
    resolve_citizen_from(
        flag,
        std::env::var(CITIZEN_ENV).ok().as_deref(),
        || GitCollector::new().user_name(),
    )
}

fn resolve_citizen_from(
    flag: Option<&str>,
    env: Option<&str>,
    git_user: impl FnOnce() -> Option<String>,
) -> String {
    [flag, env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(git_user)
        .unwrap_or_else(|| UNKNOWN_CITIZEN.to_string())
}
