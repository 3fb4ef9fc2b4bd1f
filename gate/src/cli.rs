//! Command-line interface parsing
//!
//! Handles argument parsing and validation via clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};

use city_kit::executors::DEFAULT_STANDALONE_TIMEOUT;

use crate::config::{parse_duration_value, CityConfig, OutputFormat};

/// CLI parsing result
pub enum CliResult {
    /// Run with this configuration
    Run(CityConfig),
    /// Help or version text for stdout
    Help(String),
    /// Rendered usage error for stderr
    Error(String),
}

#[derive(Debug, Parser)]
#[command(name = "gate", version)]
#[command(about = "Installation contract verification for embedded components")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify a repository's city.toml installation contract
    #[command(after_help = EXIT_CODES_HELP)]
    City(CityArgs),
}

const EXIT_CODES_HELP: &str = "\
EXIT CODES:
    0    All checks passed
    1    One or more checks failed
    2    No failures, but some checks were skipped
    3    Invalid contract, repository or arguments";

#[derive(Debug, Args)]
struct CityArgs {
    /// Repository containing city.toml
    repo_path: PathBuf,

    /// Install location checked by the split check and fail fallbacks
    #[arg(long, value_name = "PATH")]
    install_at: Option<PathBuf>,

    /// Report the standalone check as skipped
    #[arg(long)]
    skip_standalone: bool,

    /// Deadline for standalone_check (e.g. 90s, 2m, 500ms)
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_value)]
    standalone_timeout: Option<Duration>,

    /// Print the verdict as JSON
    #[arg(long)]
    json: bool,

    /// Also write the JSON verdict to a file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Actor recorded on ledger tickets
    #[arg(long)]
    citizen: Option<String>,

    /// Do not record the verdict in the ledger
    #[arg(long)]
    no_record: bool,
}

impl From<CityArgs> for CityConfig {
    fn from(args: CityArgs) -> Self {
        CityConfig {
            repo_path: args.repo_path,
            install_at: args.install_at,
            skip_standalone: args.skip_standalone,
            standalone_timeout: args.standalone_timeout.unwrap_or(DEFAULT_STANDALONE_TIMEOUT),
            output_format: if args.json {
                OutputFormat::Json
            } else {
                OutputFormat::Pretty
            },
            output_file: args.output,
            citizen: args.citizen,
            record: !args.no_record,
        }
    }
}

/// Parse command-line arguments
pub fn parse_args(args: &[String]) -> CliResult {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Command::City(city) => CliResult::Run(city.into()),
        },
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                CliResult::Help(e.render().to_string())
            }
            _ => CliResult::Error(e.render().to_string()),
        },
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliResult {
        let args: Vec<String> = std::iter::once("gate")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();
        parse_args(&args)
    }

    fn config(args: &[&str]) -> CityConfig {
        match parse(args) {
            CliResult::Run(config) => config,
            CliResult::Help(text) | CliResult::Error(text) => panic!("unexpected: {}", text),
        }
    }

    #[test]
    fn test_defaults() {
        let config = config(&["city", "repo"]);
        assert_eq!(config.repo_path, PathBuf::from("repo"));
        assert_eq!(config.install_at, None);
        assert!(!config.skip_standalone);
        assert_eq!(config.standalone_timeout, DEFAULT_STANDALONE_TIMEOUT);
        assert_eq!(config.output_format, OutputFormat::Pretty);
        assert!(config.record);
    }

    #[test]
    fn test_all_flags() {
        let config = config(&[
            "city",
            "repo",
            "--install-at",
            "/srv/host",
            "--skip-standalone",
            "--standalone-timeout",
            "90s",
            "--json",
            "-o",
            "verdict.json",
            "--citizen",
            "ada",
            "--no-record",
        ]);
        assert_eq!(config.install_at, Some(PathBuf::from("/srv/host")));
        assert!(config.skip_standalone);
        assert_eq!(config.standalone_timeout, Duration::from_secs(90));
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.output_file, Some(PathBuf::from("verdict.json")));
        assert_eq!(config.citizen.as_deref(), Some("ada"));
        assert!(!config.record);
    }

    #[test]
    fn test_usage_errors() {
        for args in [
            &["city"][..],
            &["city", "repo", "--standalone-timeout", "0s"][..],
            &["city", "repo", "--bogus"][..],
            &[][..],
        ] {
            assert!(
                matches!(parse(args), CliResult::Error(_)),
                "{:?} should be a usage error",
                args
            );
        }
    }

    #[test]
    fn test_help_and_version() {
        assert!(matches!(parse(&["--help"]), CliResult::Help(_)));
        assert!(matches!(parse(&["--version"]), CliResult::Help(_)));
        match parse(&["city", "--help"]) {
            CliResult::Help(text) => assert!(text.contains("EXIT CODES")),
            _ => panic!("expected help"),
        }
    }
}
