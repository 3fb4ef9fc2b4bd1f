//! Core run logic
//!
//! Runs the contract checks, records the verdict and emits output.

use city_kit::execution_api::{run_city, Verdict};
use city_kit::ledger::record_verdict;

use crate::config::{resolve_citizen, CityConfig, OutputFormat};
use crate::ledger::BeadLedger;
use crate::output;

/// Run `gate city` with the given configuration
///
/// Returns the verdict's exit code.
pub fn run_city_command(config: &CityConfig) -> Result<i32, RunError> {
    log::info!(
        "Verifying contract of {} ({} output)",
        config.repo_path.display(),
        config.output_format
    );

    let mut verdict = run_city(&config.repo_path, &config.run_options());

    if config.record {
        let citizen = resolve_citizen(config.citizen.as_deref());
        record_verdict(&BeadLedger::new(), &mut verdict, &citizen);
    }

    match config.output_format {
        OutputFormat::Json => println!("{}", output::build_output(&verdict)?),
        OutputFormat::Pretty => output::print_verdict(&verdict),
    }

    save_output(&verdict, config)?;

    log::info!(
        "Verdict {} for {} (exit {})",
        verdict.status,
        verdict.repo,
        verdict.exit_code
    );
    Ok(verdict.exit_code)
}

/// Save the JSON verdict to the output file, if one was requested
fn save_output(verdict: &Verdict, config: &CityConfig) -> Result<(), RunError> {
    let output_path = match &config.output_file {
        Some(path) => path,
        None => return Ok(()),
    };

    let json = output::build_output(verdict)?;
    std::fs::write(output_path, json)
        .map_err(|e| RunError::WriteFile(output_path.display().to_string(), e))?;

    if config.output_format == OutputFormat::Pretty {
        println!("Verdict saved to: {}", output_path.display());
    }
    Ok(())
}

/// Errors that can occur while producing output
#[derive(Debug)]
pub enum RunError {
    /// Failed to generate output
    Output(output::OutputError),
    /// Failed to write output file
    WriteFile(String, std::io::Error),
}

impl From<output::OutputError> for RunError {
    fn from(e: output::OutputError) -> Self {
        RunError::Output(e)
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Output(e) => write!(f, "Output generation failed: {}", e),
            RunError::WriteFile(path, e) => write!(f, "Failed to write {}: {}", path, e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Output(e) => Some(e),
            RunError::WriteFile(_, e) => Some(e),
        }
    }
}
