//! Asynchronous execution of media engine commands.
//!
//! The runner launches a [`CommandSpec`], never writes to the child's stdin,
//! and drains stdout and stderr concurrently into ordered line lists. A child
//! that could not be started is a hard [`ProcessError::Launch`]; a child that
//! ran but wrote to stderr is reported through [`ProcessOutcome::has_error`]
//! and left to the caller to judge.

use super::command::CommandSpec;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} reported errors: {}", .stderr.join("; "))]
    ToolReported { program: String, stderr: Vec<String> },

    #[error("process did not finish within {0:?}")]
    Timeout(Duration),

    #[error("I/O error while running process: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ProcessError>;

/// Captured output of one finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub program: String,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    /// Exit code, `None` when terminated by a signal.
    pub status: Option<i32>,
}

impl ProcessOutcome {
    /// Non-empty stderr counts as an error, regardless of exit status.
    pub fn has_error(&self) -> bool {
        !self.stderr.is_empty()
    }

    /// Promote a tool-reported error into a hard failure.
    pub fn into_result(self) -> Result<Self> {
        if self.has_error() {
            return Err(ProcessError::ToolReported {
                program: self.program,
                stderr: self.stderr,
            });
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self, command: &CommandSpec) -> Result<ProcessOutcome> {
        log::debug!("Launching: {command}");

        let mut child = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Launch {
                program: command.program().to_string(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("stderr was not captured"))?;

        // Both pipes are read at the same time; reading one to the end first
        // can block forever once the other pipe's buffer fills.
        let (stdout, stderr) = tokio::try_join!(collect_lines(stdout), collect_lines(stderr))?;
        let status = child.wait().await?;

        log::debug!(
            "{} exited with {:?} ({} stdout lines, {} stderr lines)",
            command.program(),
            status.code(),
            stdout.len(),
            stderr.len()
        );

        Ok(ProcessOutcome {
            program: command.program().to_string(),
            stdout,
            stderr,
            status: status.code(),
        })
    }

    /// Like [`run`](Self::run), but the child is killed once `limit` elapses.
    pub async fn run_with_timeout(
        &self,
        command: &CommandSpec,
        limit: Duration,
    ) -> Result<ProcessOutcome> {
        // Dropping the pending future drops the child, and kill_on_drop reaps it.
        tokio::time::timeout(limit, self.run(command))
            .await
            .map_err(|_| ProcessError::Timeout(limit))?
    }

    /// Start the command on the ambient tokio runtime and hand back a task
    /// that can be polled with `is_finished` or awaited.
    pub fn spawn(&self, command: CommandSpec) -> tokio::task::JoinHandle<Result<ProcessOutcome>> {
        let runner = self.clone();
        tokio::spawn(async move { runner.run(&command).await })
    }

    /// Block the calling thread until the command finishes.
    ///
    /// Only call this from plain background threads. It builds its own
    /// runtime and will panic if invoked from inside an async context.
    pub fn run_blocking(&self, command: &CommandSpec) -> Result<ProcessOutcome> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run(command))
    }
}

async fn collect_lines<R: AsyncRead + Unpin>(reader: R) -> io::Result<Vec<String>> {
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        lines.push(line.trim_end_matches(['\n', '\r']).to_string());
    }

    Ok(lines)
}
