//! # Standalone Executor
//!
//! Proves the component works without any host files: a fresh shallow clone
//! in a scratch directory, then the declared self-check run through
//! `bash -lc` under a deadline with an allowlisted environment.
//!
//! The scratch directory is a `gate-city-*` [`tempfile::TempDir`], removed
//! on every path out of [`check_standalone_in`].

use std::path::Path;
use std::time::Duration;

use crate::collectors::{GitCollector, GitError};
use crate::commands::{create_standalone_executor, CancelFlag, CommandError};
use crate::verdict::CheckOutcome;

/// Deadline applied when the caller does not supply one
pub const DEFAULT_STANDALONE_TIMEOUT: Duration = Duration::from_secs(120);

/// Name prefix of the scratch directory holding the clone
pub const SCRATCH_PREFIX: &str = "gate-city-";

/// Lines of output kept in a failure detail
const OUTPUT_LINES: usize = 4;

/// Inputs for one standalone run
#[derive(Debug, Clone, Copy)]
pub struct StandaloneRequest<'a> {
    pub repo_root: &'a Path,
    pub command: &'a str,
    pub skip: bool,
    pub timeout: Duration,
    pub cancel: Option<&'a CancelFlag>,
}

/// Run the self-check with scratch space under the system temp directory
pub fn check_standalone(request: &StandaloneRequest<'_>) -> CheckOutcome {
    check_standalone_in(request, &std::env::temp_dir())
}

/// Run the self-check with scratch space under `scratch_root`
pub fn check_standalone_in(request: &StandaloneRequest<'_>, scratch_root: &Path) -> CheckOutcome {
    if request.skip {
        return CheckOutcome::skip("skipped by --skip-standalone");
    }
    if request.command.trim().is_empty() {
        return CheckOutcome::skip("standalone_check empty in city.toml");
    }
    if request.cancel.is_some_and(CancelFlag::is_cancelled) {
        return CheckOutcome::fail("standalone_check cancelled");
    }

    let scratch = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir_in(scratch_root);
    let workspace = match scratch {
        Ok(dir) => dir,
        Err(e) => return CheckOutcome::fail(format!("failed to prepare temp dir: {}", e)),
    };

    let outcome = run_in_clone(request, &workspace.path().join("repo"));

    if let Err(e) = workspace.close() {
        log::warn!("Failed to remove standalone workspace: {}", e);
    }
    outcome
}

fn run_in_clone(request: &StandaloneRequest<'_>, clone_dir: &Path) -> CheckOutcome {
    if let Err(e) = GitCollector::new().clone_shallow(request.repo_root, clone_dir) {
        log::warn!("Standalone clone of {} failed: {}", request.repo_root.display(), e);
        let detail = match &e {
            GitError::Failed { output, .. } => trim_output(output, &e.to_string()),
            other => trim_output("", &other.to_string()),
        };
        return CheckOutcome::fail(format!("clone failed: {}", detail));
    }

    let timeout = if request.timeout.is_zero() {
        DEFAULT_STANDALONE_TIMEOUT
    } else {
        request.timeout
    };

    let result = create_standalone_executor().execute_in(
        clone_dir,
        "bash",
        &["-lc", request.command],
        Some(timeout),
        request.cancel,
    );

    match result {
        Ok(out) if out.success() => CheckOutcome::pass("standalone_check exited 0"),
        Ok(out) => CheckOutcome::fail(format!(
            "standalone_check failed: {}",
            trim_output(&out.output, &format!("exit status {}", out.exit_code))
        )),
        Err(CommandError::TimedOut { .. }) => CheckOutcome::fail(format!(
            "standalone_check timed out after {}",
            format_duration(timeout)
        )),
        Err(CommandError::Cancelled(_)) => CheckOutcome::fail("standalone_check cancelled"),
        Err(e) => CheckOutcome::fail(format!(
            "standalone_check failed: {}",
            trim_output("", &e.to_string())
        )),
    }
}

/// First few lines of command output joined with ` | `
///
/// Falls back to `error`, then to `unknown error`, when output is blank.
pub fn trim_output(output: &str, error: &str) -> String {
    let output = output.trim();
    if output.is_empty() {
        return if error.is_empty() {
            "unknown error".to_string()
        } else {
            error.to_string()
        };
    }
    output
        .lines()
        .take(OUTPUT_LINES)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Compact duration such as `250ms`, `30s`, `2m` or `1h`
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1000 != 0 || millis == 0 {
        return format!("{}ms", millis);
    }
    let secs = duration.as_secs();
    if secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
