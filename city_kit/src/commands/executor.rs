//! Allowlisted subprocess executor
//!
//! Every external program the engine touches (git, the standalone shell) is
//! spawned through [`SystemCommandExecutor`]. A command must be explicitly
//! allowed before it can run. Waiting is bounded by an optional deadline and
//! an optional [`CancelFlag`]; when either fires the child's whole process
//! group is killed and reaped.
//!
//! Stdout and stderr share one anonymous temporary file, so output is
//! combined in write order and a background grandchild holding the pipe can
//! never stall collection.

use std::collections::BTreeSet;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use wait_timeout::ChildExt;

/// How often the wait loop re-checks the deadline and the cancel flag
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Shared cancellation signal
///
/// Clones observe the same flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of a command that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `-1` when the process was terminated by a signal
    pub exit_code: i32,
    /// Interleaved stdout and stderr
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command not allowed: {0}")]
    NotAllowed(String),
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o error while running {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },
    #[error("{0} cancelled")]
    Cancelled(String),
}

/// Subprocess runner restricted to an allowlist of program names
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor {
    allowed: BTreeSet<String>,
    default_timeout: Option<Duration>,
    env_allowlist: Option<Vec<String>>,
}

impl SystemCommandExecutor {
    /// Executor with no allowed commands and no deadline
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: Some(timeout),
            ..Self::default()
        }
    }

    pub fn allow_commands(&mut self, commands: &[&str]) -> &mut Self {
        self.allowed
            .extend(commands.iter().map(|command| command.to_string()));
        self
    }

    /// Start children with an empty environment plus the listed variables
    ///
    /// Only variables that are set to a non-empty value are passed through.
    pub fn with_isolated_env(&mut self, keys: &[&str]) -> &mut Self {
        self.env_allowlist = Some(keys.iter().map(|key| key.to_string()).collect());
        self
    }

    pub fn is_allowed(&self, command: &str) -> bool {
        self.allowed.contains(command)
    }

    /// Run in the current directory
    pub fn execute(
        &self,
        command: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        self.run(None, command, args, timeout, None)
    }

    /// Run in `dir`, honoring an optional cancel flag
    pub fn execute_in(
        &self,
        dir: &Path,
        command: &str,
        args: &[&str],
        timeout: Option<Duration>,
        cancel: Option<&CancelFlag>,
    ) -> Result<CommandOutput, CommandError> {
        self.run(Some(dir), command, args, timeout, cancel)
    }

    fn run(
        &self,
        dir: Option<&Path>,
        command: &str,
        args: &[&str],
        timeout: Option<Duration>,
        cancel: Option<&CancelFlag>,
    ) -> Result<CommandOutput, CommandError> {
        if !self.is_allowed(command) {
            return Err(CommandError::NotAllowed(command.to_string()));
        }

        let io_error = |source| CommandError::Io {
            command: command.to_string(),
            source,
        };

        let mut capture = tempfile::tempfile().map_err(io_error)?;
        let stdout = capture.try_clone().map_err(io_error)?;
        let stderr = capture.try_clone().map_err(io_error)?;

        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        if let Some(keys) = &self.env_allowlist {
            cmd.env_clear();
            for key in keys {
                match std::env::var(key) {
                    Ok(value) if !value.is_empty() => {
                        cmd.env(key, value);
                    }
                    _ => {}
                }
            }
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        log::debug!("Running {} {:?}", command, args);
        let mut child = cmd.spawn().map_err(|source| CommandError::Spawn {
            command: command.to_string(),
            source,
        })?;

        let timeout = timeout.or(self.default_timeout);
        let started = Instant::now();
        let status = loop {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                terminate(&mut child);
                return Err(CommandError::Cancelled(command.to_string()));
            }

            let slice = match timeout {
                Some(limit) => {
                    let remaining = limit.saturating_sub(started.elapsed());
                    if remaining.is_zero() {
                        terminate(&mut child);
                        return Err(CommandError::TimedOut {
                            command: command.to_string(),
                            timeout: limit,
                        });
                    }
                    remaining.min(POLL_INTERVAL)
                }
                None => POLL_INTERVAL,
            };

            match child.wait_timeout(slice) {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    terminate(&mut child);
                    return Err(io_error(source));
                }
            }
        };

        capture.seek(SeekFrom::Start(0)).map_err(io_error)?;
        let mut raw = Vec::new();
        capture.read_to_end(&mut raw).map_err(io_error)?;

        Ok(CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            output: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}

/// Kill the child's process group, then the child, then reap it
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Ok(pid) = i32::try_from(child.id()) {
            if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                log::debug!("killpg({}) failed: {}", pid, e);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_allowed() {
        let executor = SystemCommandExecutor::new();
        let err = executor.execute("sh", &["-c", "true"], None).unwrap_err();
        assert!(matches!(err, CommandError::NotAllowed(ref c) if c == "sh"));
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_cancelled());
        flag.cancel();
        assert!(observer.is_cancelled());
    }

    #[cfg(unix)]
    mod unix_tests {
        use super::*;

        fn shell() -> SystemCommandExecutor {
            let mut executor = SystemCommandExecutor::new();
            executor.allow_commands(&["sh"]);
            executor
        }

        #[test]
        fn test_combined_output_and_exit_code() {
            let out = shell()
                .execute("sh", &["-c", "echo out; echo err 1>&2; exit 4"], None)
                .unwrap();
            assert_eq!(out.exit_code, 4);
            assert!(!out.success());
            assert_eq!(out.output, "out\nerr\n");
        }

        #[test]
        fn test_runs_in_directory() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("marker"), "").unwrap();
            let out = shell()
                .execute_in(dir.path(), "sh", &["-c", "ls"], None, None)
                .unwrap();
            assert!(out.success());
            assert!(out.output.contains("marker"));
        }

        #[test]
        fn test_deadline_kills_child() {
            let started = Instant::now();
            let err = shell()
                .execute("sh", &["-c", "sleep 5"], Some(Duration::from_millis(50)))
                .unwrap_err();
            assert!(matches!(err, CommandError::TimedOut { .. }));
            assert!(started.elapsed() < Duration::from_secs(4));
        }

        #[test]
        fn test_cancelled_before_exit() {
            let dir = tempfile::tempdir().unwrap();
            let flag = CancelFlag::new();
            flag.cancel();
            let err = shell()
                .execute_in(dir.path(), "sh", &["-c", "sleep 5"], None, Some(&flag))
                .unwrap_err();
            assert!(matches!(err, CommandError::Cancelled(_)));
        }

        #[test]
        fn test_isolated_env_drops_unlisted_vars() {
            std::env::set_var("CITY_KIT_TEST_SECRET", "hunter2");
            let mut executor = shell();
            executor.with_isolated_env(&["PATH"]);
            let out = executor
                .execute("sh", &["-c", "echo \"[${CITY_KIT_TEST_SECRET}]\""], None)
                .unwrap();
            assert_eq!(out.output.trim(), "[]");
        }
    }
}
