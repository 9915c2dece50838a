//! Shell command execution.
//!
//! Commands run one at a time, in registration order, through `<shell> -c`.
//! Their output streams are inherited from the current process; stdin is
//! `/dev/null`.

use std::{
    process::{Command, ExitStatus, Stdio},
    thread,
    time::Duration,
};

use thiserror::Error;
use tracing::{debug, info};

use crate::context::BuildContext;

/// How often a running child is checked for exit or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Command execution errors. Each variant carries the command text.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The shell could not be started.
    #[error("{command:?}: failed to spawn: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the child failed.
    #[error("{command:?}: failed to wait: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited unsuccessfully.
    #[error("{command:?}: {status}")]
    Failed { command: String, status: ExitStatus },

    /// The build was cancelled before or while the command ran.
    #[error("{command:?}: cancelled")]
    Cancelled { command: String },
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Runs build commands sequentially through a shell.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    shell: String,
}

impl CommandRunner {
    /// Create a runner, picking the shell from `shell`, `$SHELL`, or `sh`.
    #[must_use]
    pub fn new(shell: Option<&str>) -> Self {
        Self {
            shell: resolve_shell(shell),
        }
    }

    /// The shell commands are passed to.
    #[must_use]
    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Run every command in order, stopping at the first failure.
    pub fn run_all(&self, commands: &[String], cx: &BuildContext) -> Result<usize> {
        for command in commands {
            self.run(command, cx)?;
        }
        Ok(commands.len())
    }

    /// Run a single command to completion.
    pub fn run(&self, command: &str, cx: &BuildContext) -> Result<()> {
        if cx.is_cancelled() {
            return Err(CommandError::Cancelled {
                command: command.to_string(),
            });
        }

        info!(command, "running");
        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let status = loop {
            let polled = child.try_wait().map_err(|source| CommandError::Wait {
                command: command.to_string(),
                source,
            })?;
            if let Some(status) = polled {
                break status;
            }

            if cx.is_cancelled() {
                debug!(command, pid = child.id(), "killing cancelled command");
                // The child may have exited since the last poll.
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::Cancelled {
                    command: command.to_string(),
                });
            }

            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(CommandError::Failed {
                command: command.to_string(),
                status,
            });
        }

        debug!(command, "finished");
        Ok(())
    }
}

fn resolve_shell(shell: Option<&str>) -> String {
    shell
        .map(str::to_string)
        .or_else(|| std::env::var("SHELL").ok().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "sh".to_string())
}
