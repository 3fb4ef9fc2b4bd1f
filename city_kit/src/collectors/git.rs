//! # Git Collector
//!
//! Observations delegated to the real `git` binary: work-tree probe, the
//! ignore-semantics oracle, shallow clones and the configured user name.
//! Ignore rules are never evaluated locally.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::commands::{create_git_command_executor, CommandError, SystemCommandExecutor};

#[derive(Debug, Error)]
pub enum GitError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("not a git repository: {}", .0.display())]
    NotWorkTree(PathBuf),
    #[error("git {operation} exited {exit_code}: {output}")]
    Failed {
        operation: &'static str,
        exit_code: i32,
        output: String,
    },
}

/// "Would git ignore this path?"
///
/// `candidate` is relative to `repo_root` and need not exist.
pub trait IgnoreOracle {
    fn is_ignored(&self, repo_root: &Path, candidate: &str) -> Result<bool, GitError>;
}

/// Collector backed by the `git` executable
#[derive(Debug, Clone)]
pub struct GitCollector {
    executor: SystemCommandExecutor,
}

impl Default for GitCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCollector {
    pub fn new() -> Self {
        Self::with_executor(create_git_command_executor())
    }

    pub fn with_executor(executor: SystemCommandExecutor) -> Self {
        Self { executor }
    }

    /// Fail unless `repo_root` is inside a git work tree
    pub fn ensure_work_tree(&self, repo_root: &Path) -> Result<(), GitError> {
        let root = repo_root.to_string_lossy();
        let out = self.executor.execute(
            "git",
            &["-C", &root, "rev-parse", "--is-inside-work-tree"],
            None,
        )?;
        if out.success() && out.output.trim() == "true" {
            Ok(())
        } else {
            Err(GitError::NotWorkTree(repo_root.to_path_buf()))
        }
    }

    /// `git clone --depth 1` of `repo_root` into `dest`
    pub fn clone_shallow(&self, repo_root: &Path, dest: &Path) -> Result<(), GitError> {
        let source = repo_root.to_string_lossy();
        let target = dest.to_string_lossy();
        let out = self.executor.execute(
            "git",
            &["clone", "--quiet", "--depth", "1", &source, &target],
            None,
        )?;
        if out.success() {
            Ok(())
        } else {
            Err(GitError::Failed {
                operation: "clone",
                exit_code: out.exit_code,
                output: out.output.trim().to_string(),
            })
        }
    }

    /// `git config user.name`, if set
    pub fn user_name(&self) -> Option<String> {
        let out = self
            .executor
            .execute("git", &["config", "user.name"], None)
            .ok()?;
        let name = out.output.trim();
        (out.success() && !name.is_empty()).then(|| name.to_string())
    }
}

impl IgnoreOracle for GitCollector {
    /// `git check-ignore -q --no-index -- <candidate>`: exit 0 ignored, 1 not ignored
    ///
    /// The `--` keeps candidates starting with `-` from being read as options.
    fn is_ignored(&self, repo_root: &Path, candidate: &str) -> Result<bool, GitError> {
        let root = repo_root.to_string_lossy();
        let out = self.executor.execute(
            "git",
            &["-C", &root, "check-ignore", "-q", "--no-index", "--", candidate],
            None,
        )?;
        match out.exit_code {
            0 => Ok(true),
            1 => Ok(false),
            exit_code => Err(GitError::Failed {
                operation: "check-ignore",
                exit_code,
                output: out.output.trim().to_string(),
            }),
        }
    }
}
