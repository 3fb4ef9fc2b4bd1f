//! # Boundary Executor
//!
//! Every declared path must be excluded from version control. Exclusion is
//! decided by the [`IgnoreOracle`], queried with a concrete candidate path:
//! the literal path for files, a probe file inside the directory for
//! directory entries, and a synthesized match for globs.

use std::path::Path;

use crate::collectors::{GitError, IgnoreOracle};
use crate::contracts::{DeclaredPath, PathKind};
use crate::executors::standalone::trim_output;
use crate::glob::synthesize_path;
use crate::verdict::CheckOutcome;

/// File name probed inside directory entries
pub const DIRECTORY_PROBE: &str = ".gate-city-sample";

/// Concrete path handed to the oracle for one declared entry
pub fn ignore_candidate(entry: &DeclaredPath) -> String {
    match entry.kind() {
        PathKind::Glob => synthesize_path(entry.as_str()),
        PathKind::Directory => format!("{}/{}", entry.bare(), DIRECTORY_PROBE),
        PathKind::File => entry.as_str().to_string(),
    }
}

/// Pass iff the oracle reports every entry as ignored
///
/// An oracle error fails the whole check.
pub fn check_boundary(
    repo_root: &Path,
    polis_files: &[DeclaredPath],
    oracle: &dyn IgnoreOracle,
) -> CheckOutcome {
    if polis_files.is_empty() {
        return CheckOutcome::pass("no polis_files declared");
    }

    let mut exposed = Vec::new();
    for entry in polis_files {
        let candidate = ignore_candidate(entry);
        match oracle.is_ignored(repo_root, &candidate) {
            Ok(true) => log::debug!("{} ignored (probe {})", entry, candidate),
            Ok(false) => exposed.push(entry.as_str()),
            Err(e) => {
                log::warn!("git check-ignore failed for {}: {}", entry, e);
                let detail = match &e {
                    GitError::Failed { output, .. } => trim_output(output, &e.to_string()),
                    other => other.to_string(),
                };
                return CheckOutcome::fail(format!(
                    "git check-ignore failed for {:?}: {}",
                    entry.as_str(),
                    detail
                ));
            }
        }
    }

    if exposed.is_empty() {
        CheckOutcome::pass(format!(
            "{} polis_files all ignored by Git semantics",
            polis_files.len()
        ))
    } else {
        CheckOutcome::fail(format!(
            "not ignored by Git semantics: {}",
            exposed.join(", ")
        ))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::CheckStatus;
    use std::cell::RefCell;

    /// Ignores exactly the listed candidates and records every query
    struct FakeOracle {
        ignored: Vec<&'static str>,
        queries: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl FakeOracle {
        fn new(ignored: &[&'static str]) -> Self {
            Self {
                ignored: ignored.to_vec(),
                queries: RefCell::new(Vec::new()),
                fail_on: None,
            }
        }
    }

    impl IgnoreOracle for FakeOracle {
        fn is_ignored(&self, _repo_root: &Path, candidate: &str) -> Result<bool, GitError> {
            self.queries.borrow_mut().push(candidate.to_string());
            if self.fail_on == Some(candidate) {
                return Err(GitError::Failed {
                    operation: "check-ignore",
                    exit_code: 128,
                    output: "error: unknown switch `p'\nusage: git check-ignore [<options>] <pathname>...\n\n    -q, --quiet\n    -v, --verbose\n    --stdin".to_string(),
                });
            }
            Ok(self.ignored.iter().any(|ignored| *ignored == candidate))
        }
    }

    fn entries(raw: &[&str]) -> Vec<DeclaredPath> {
        raw.iter().map(|r| DeclaredPath::parse(r).unwrap()).collect()
    }

    #[test]
    fn test_ignore_candidates() {
        let cases = [
            ("secret.yaml", "secret.yaml"),
            ("memory/", "memory/.gate-city-sample"),
            ("memory/**", "memory/sample"),
            ("logs/*.log", "logs/sample.log"),
        ];
        for (raw, want) in cases {
            assert_eq!(ignore_candidate(&DeclaredPath::parse(raw).unwrap()), want);
        }
    }

    #[test]
    fn test_empty_passes() {
        let oracle = FakeOracle::new(&[]);
        let outcome = check_boundary(Path::new("."), &[], &oracle);
        assert_eq!(outcome.status, CheckStatus::Pass);
        assert_eq!(outcome.detail, "no polis_files declared");
    }

    #[test]
    fn test_all_ignored() {
        let oracle = FakeOracle::new(&["secret.yaml", "memory/.gate-city-sample"]);
        let outcome = check_boundary(
            Path::new("."),
            &entries(&["secret.yaml", "memory/"]),
            &oracle,
        );
        assert_eq!(outcome.status, CheckStatus::Pass);
        assert_eq!(outcome.detail, "2 polis_files all ignored by Git semantics");
    }

    #[test]
    fn test_lists_every_exposed_entry() {
        let oracle = FakeOracle::new(&["b.yaml"]);
        let outcome = check_boundary(
            Path::new("."),
            &entries(&["a.yaml", "b.yaml", "memory/"]),
            &oracle,
        );
        assert_eq!(outcome.status, CheckStatus::Fail);
        assert_eq!(outcome.detail, "not ignored by Git semantics: a.yaml, memory/");
        assert_eq!(oracle.queries.borrow().len(), 3);
    }

    #[test]
    fn test_oracle_error_fails_closed() {
        let mut oracle = FakeOracle::new(&["a.yaml", "b.yaml"]);
        oracle.fail_on = Some("b.yaml");
        let outcome = check_boundary(Path::new("."), &entries(&["a.yaml", "b.yaml"]), &oracle);
        assert_eq!(outcome.status, CheckStatus::Fail);
        assert_eq!(
            outcome.detail,
            "git check-ignore failed for \"b.yaml\": error: unknown switch `p' | \
             usage: git check-ignore [<options>] <pathname>... |  |     -q, --quiet"
        );
    }
}
