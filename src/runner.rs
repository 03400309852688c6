//! Collector process supervision.
//!
//! One [`CollectorProcess`] per spawn: runs a collector command through
//! the shell, exposes its stdout as a lazy line stream, and reaps the
//! child once the stream is drained. Not restartable — the agent spawns
//! a fresh process every cycle.

use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};

/// Errors that can occur while supervising a collector process.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Child process could not be started.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// Child stdout pipe was not captured.
    #[error("collector stdout was not captured")]
    MissingStdout,

    /// I/O error while reading output or reaping the child.
    #[error("collector i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A running collector child process and its output stream.
pub struct CollectorProcess {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
}

impl CollectorProcess {
    /// Spawn `command` through `/bin/sh -c`.
    ///
    /// The child's stdin is a discard sink so collectors never block
    /// waiting for input. Stdout is piped back to the agent. Stderr is
    /// inherited when `attached` (foreground mode) and discarded when
    /// the agent runs detached.
    pub fn spawn(command: &str, attached: bool) -> Result<Self, RunnerError> {
        let stderr = if attached {
            Stdio::inherit()
        } else {
            Stdio::null()
        };

        let mut child = Command::new("/bin/sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                command: command.to_owned(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or(RunnerError::MissingStdout)?;
        let lines = BufReader::new(stdout).lines();

        tracing::debug!(command, pid = child.id(), "collector started");
        Ok(Self { child, lines })
    }

    /// Next output line, or `None` at end of stream.
    pub async fn next_line(&mut self) -> Result<Option<String>, RunnerError> {
        Ok(self.lines.next_line().await?)
    }

    /// Close the read side and wait for the child to exit.
    pub async fn wait(mut self) -> Result<ExitStatus, RunnerError> {
        drop(self.lines);
        Ok(self.child.wait().await?)
    }
}

impl std::fmt::Debug for CollectorProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorProcess")
            .field("pid", &self.child.id())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drain(process: &mut CollectorProcess) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = process.next_line().await.unwrap() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn test_spawn_reads_lines_in_order() {
        let mut process =
            CollectorProcess::spawn("printf 'one\\ntwo\\nthree\\n'", true).unwrap();
        assert_eq!(drain(&mut process).await, ["one", "two", "three"]);

        let status = process.wait().await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_nonzero_exit_after_output() {
        let mut process =
            CollectorProcess::spawn("echo 'SAMPLE 1 a:b 1'; exit 3", true).unwrap();
        assert_eq!(drain(&mut process).await.len(), 1);

        let status = process.wait().await.unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[tokio::test]
    async fn test_silent_collector() {
        let mut process = CollectorProcess::spawn("true", true).unwrap();
        assert!(drain(&mut process).await.is_empty());
        assert!(process.wait().await.unwrap().success());
    }

    #[tokio::test]
    async fn test_stdin_is_discarded() {
        // `cat` with a null stdin sees immediate EOF instead of blocking.
        let mut process = CollectorProcess::spawn("cat", true).unwrap();
        assert!(drain(&mut process).await.is_empty());
        assert!(process.wait().await.unwrap().success());
    }
}
