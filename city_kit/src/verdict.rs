//! # Verdict
//!
//! Check results, summary counts and the aggregated verdict with its exit
//! code. The exit code is derived from the summary alone, except for the
//! `invalid` short-circuit which bypasses aggregation.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// All checks passed
pub const EXIT_PASS: i32 = 0;
/// One or more checks failed
pub const EXIT_FAIL: i32 = 1;
/// No failures, but at least one check was skipped
pub const EXIT_WARN: i32 = 2;
/// Malformed contract or not a repository
pub const EXIT_INVALID: i32 = 3;

/// Name of the synthetic check carried by an invalid verdict
pub const CONTRACT_CHECK: &str = "contract";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "pass"),
            CheckStatus::Fail => write!(f, "fail"),
            CheckStatus::Skip => write!(f, "skip"),
        }
    }
}

/// What a check decided, before timing is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    pub detail: String,
}

impl CheckOutcome {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Pass,
            detail: detail.into(),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Fail,
            detail: detail.into(),
        }
    }

    pub fn skip(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Skip,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
    pub duration_ms: u64,
}

/// Run a check and attach its name and elapsed time
pub fn timed_check(name: &str, check: impl FnOnce() -> CheckOutcome) -> CheckResult {
    let started = Instant::now();
    let outcome = check();
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    log::info!(
        "Check {}: {} ({}ms) {}",
        name,
        outcome.status,
        duration_ms,
        outcome.detail
    );

    CheckResult {
        name: name.to_string(),
        status: outcome.status,
        detail: outcome.detail,
        duration_ms,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub pass: usize,
    pub fail: usize,
    pub skip: usize,
}

impl Summary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        results
            .iter()
            .fold(Summary::default(), |mut summary, result| {
                match result.status {
                    CheckStatus::Pass => summary.pass += 1,
                    CheckStatus::Fail => summary.fail += 1,
                    CheckStatus::Skip => summary.skip += 1,
                }
                summary
            })
    }

    pub fn status(&self) -> VerdictStatus {
        if self.fail > 0 {
            VerdictStatus::Fail
        } else if self.skip > 0 {
            VerdictStatus::Warn
        } else {
            VerdictStatus::Pass
        }
    }

    /// Get the exit code based on results
    pub fn exit_code(&self) -> i32 {
        self.status().exit_code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Pass,
    Warn,
    Fail,
    Invalid,
}

impl VerdictStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            VerdictStatus::Pass => EXIT_PASS,
            VerdictStatus::Fail => EXIT_FAIL,
            VerdictStatus::Warn => EXIT_WARN,
            VerdictStatus::Invalid => EXIT_INVALID,
        }
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictStatus::Pass => write!(f, "pass"),
            VerdictStatus::Warn => write!(f, "warn"),
            VerdictStatus::Fail => write!(f, "fail"),
            VerdictStatus::Invalid => write!(f, "invalid"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub pass: bool,
    pub status: VerdictStatus,
    pub repo: String,
    pub checks: Vec<CheckResult>,
    pub summary: Summary,
    pub exit_code: i32,
    /// Durable record id, set after the ledger accepted the verdict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_id: Option<String>,
}

impl Verdict {
    /// Fold check results into a verdict
    pub fn aggregate(repo: impl Into<String>, checks: Vec<CheckResult>) -> Self {
        let summary = Summary::from_results(&checks);
        let status = summary.status();
        Self {
            pass: status == VerdictStatus::Pass,
            status,
            repo: repo.into(),
            checks,
            summary,
            exit_code: summary.exit_code(),
            ledger_id: None,
        }
    }

    /// Terminal verdict for a malformed contract or a non-repository input
    pub fn invalid(repo: impl Into<String>, detail: impl Into<String>) -> Self {
        let checks = vec![CheckResult {
            name: CONTRACT_CHECK.to_string(),
            status: CheckStatus::Fail,
            detail: detail.into(),
            duration_ms: 0,
        }];
        Self {
            pass: false,
            status: VerdictStatus::Invalid,
            repo: repo.into(),
            summary: Summary::from_results(&checks),
            checks,
            exit_code: EXIT_INVALID,
            ledger_id: None,
        }
    }

    /// Whether the ledger should hold an open ticket for this verdict
    pub fn is_failure(&self) -> bool {
        matches!(self.status, VerdictStatus::Fail | VerdictStatus::Invalid)
    }
}
