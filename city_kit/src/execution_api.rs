//! # City Run API
//!
//! High-level entry point for verifying a repository's installation
//! contract. Callers only need to:
//! 1. Build [`RunOptions`]
//! 2. Call [`run_city()`]
//!
//! ## Example
//!
//! ```ignore
//! use city_kit::execution_api::{run_city, RunOptions};
//! use std::path::Path;
//!
//! let verdict = run_city(Path::new("."), &RunOptions::default());
//! for check in &verdict.checks {
//!     println!("{} {} {}", check.name, check.status, check.detail);
//! }
//! std::process::exit(verdict.exit_code);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Internal imports
// ============================================================================

use crate::collectors::GitCollector;
use crate::contracts::load_contract;
use crate::executors::{
    check_boundary, check_hooks, check_split, check_standalone, StandaloneRequest,
    DEFAULT_STANDALONE_TIMEOUT,
};
use crate::verdict::timed_check;

// ============================================================================
// Re-exports - types callers need to drive a run and read its result
// ============================================================================

pub use crate::commands::CancelFlag;
pub use crate::contracts::{Contract, ContractError};
pub use crate::verdict::{CheckResult, CheckStatus, Summary, Verdict, VerdictStatus};

/// Check names, in reporting order
pub const CHECK_BOUNDARY: &str = "boundary";
pub const CHECK_STANDALONE: &str = "standalone";
pub const CHECK_HOOKS: &str = "config-hooks";
pub const CHECK_SPLIT: &str = "split";

// ============================================================================
// Options
// ============================================================================

/// Run-time options for one invocation
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Install location for the split check and `fail` hook fallbacks
    pub install_at: Option<PathBuf>,

    /// Report the standalone check as skipped
    pub skip_standalone: bool,

    /// Deadline for the standalone self-check; zero means the default
    pub standalone_timeout: Duration,

    /// Aborts the standalone self-check when set
    pub cancel: Option<CancelFlag>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            install_at: None,
            skip_standalone: false,
            standalone_timeout: DEFAULT_STANDALONE_TIMEOUT,
            cancel: None,
        }
    }
}

// ============================================================================
// Run
// ============================================================================

/// Verify the contract of the repository at `repo_path`
///
/// Never fails: an unreadable repository or contract yields the `invalid`
/// verdict, and every check error becomes a `fail` result.
pub fn run_city(repo_path: &Path, options: &RunOptions) -> Verdict {
    let repo_root = match std::path::absolute(repo_path) {
        Ok(path) => path,
        Err(e) => {
            return Verdict::invalid(
                repo_path.display().to_string(),
                format!("invalid repo path: {}", e),
            )
        }
    };
    let repo = repo_name(&repo_root);

    let git = GitCollector::new();
    if let Err(e) = git.ensure_work_tree(&repo_root) {
        log::warn!("{} is not a usable repository: {}", repo_root.display(), e);
        return Verdict::invalid(repo, format!("invalid repo input: {}", e));
    }

    let contract = match load_contract(&repo_root) {
        Ok(contract) => contract,
        Err(e) => {
            log::warn!("Contract rejected: {}", e);
            return Verdict::invalid(repo, e.to_string());
        }
    };

    let install_at = options.install_at.as_deref();
    let standalone = StandaloneRequest {
        repo_root: &repo_root,
        command: &contract.standalone_check,
        skip: options.skip_standalone,
        timeout: options.standalone_timeout,
        cancel: options.cancel.as_ref(),
    };

    let checks = vec![
        timed_check(CHECK_BOUNDARY, || {
            check_boundary(&repo_root, &contract.polis_files, &git)
        }),
        timed_check(CHECK_STANDALONE, || check_standalone(&standalone)),
        timed_check(CHECK_HOOKS, || check_hooks(&contract, install_at)),
        timed_check(CHECK_SPLIT, || {
            check_split(&contract.polis_files, install_at)
        }),
    ];

    Verdict::aggregate(repo, checks)
}

/// Last path component, or the whole path for roots
fn repo_name(repo_root: &Path) -> String {
    repo_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| repo_root.display().to_string())
}
