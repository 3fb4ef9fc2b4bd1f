//! Command execution configurations
//!
//! Provides allowlisted command executors for git queries and the isolated
//! standalone self-check.

pub mod executor;
pub mod git;

pub use executor::{CancelFlag, CommandError, CommandOutput, SystemCommandExecutor};
pub use git::{create_git_command_executor, create_standalone_executor, ISOLATED_ENV_KEYS};
