//! Git and standalone-shell executor configurations

use super::executor::SystemCommandExecutor;

/// Variables passed through to the standalone self-check
pub const ISOLATED_ENV_KEYS: [&str; 6] = ["PATH", "HOME", "TMPDIR", "LANG", "LC_ALL", "TERM"];

/// Create command executor for git queries and clones
///
/// No default deadline: ignore queries, work-tree probes and shallow clones
/// are expected to return quickly.
pub fn create_git_command_executor() -> SystemCommandExecutor {
    let mut executor = SystemCommandExecutor::new();
    executor.allow_commands(&["git"]);
    executor
}

/// Create command executor for the standalone self-check
///
/// Runs through `bash -lc` with an environment reduced to
/// [`ISOLATED_ENV_KEYS`]. The deadline is supplied per call.
pub fn create_standalone_executor() -> SystemCommandExecutor {
    let mut executor = SystemCommandExecutor::new();
    executor
        .allow_commands(&["bash"])
        .with_isolated_env(&ISOLATED_ENV_KEYS);
    executor
}
