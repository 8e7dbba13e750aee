//! SSH command execution for polls
//!
//! Each poll spawns its own `ssh` process in batch mode, runs the composite
//! command for the node kind and collects stdout and stderr separately. The
//! whole attempt runs under one deadline; the child is spawned with
//! `kill_on_drop` so a timed-out attempt never leaves a session behind.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::parser::{OutputParser, poll_command};
use super::settings::PollSettings;
use crate::config::SshCredentials;
use crate::error::{PollError, PollResult};
use crate::models::{NodeDescriptor, NodeKind};

/// Exit status `ssh` uses for its own failures (connect, auth, host key)
const SSH_ERROR_EXIT: i32 = 255;

/// Runs one poll against one node.
///
/// Implementations return the raw combined output on success. The scheduler
/// only depends on this trait so tests can substitute scripted executors.
#[async_trait]
pub trait PollExecutor: Send + Sync {
    /// Polls `node` once, bounded by the executor's own deadline
    async fn execute(&self, node: &NodeDescriptor) -> PollResult<String>;
}

/// [`PollExecutor`] backed by the system `ssh` client
#[derive(Debug, Clone)]
pub struct SshExecutor {
    program: PathBuf,
    credentials: SshCredentials,
    settings: PollSettings,
}

impl SshExecutor {
    /// Creates an executor using `ssh` from `PATH`
    #[must_use]
    pub fn new(credentials: SshCredentials, settings: PollSettings) -> Self {
        Self {
            program: PathBuf::from("ssh"),
            credentials,
            settings,
        }
    }

    /// Uses a different client binary (e.g. a wrapper script)
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Builds the `ssh` argument list for one poll
    #[must_use]
    pub fn ssh_args(&self, host: &str, command: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "LogLevel=ERROR".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.settings.connect_timeout().as_secs()),
            "-i".to_string(),
            self.credentials.key_path.display().to_string(),
        ];

        if self.credentials.port != 22 {
            args.push("-p".to_string());
            args.push(self.credentials.port.to_string());
        }

        args.push(format!("{}@{host}", self.credentials.username));
        args.push(command.to_string());
        args
    }
}

#[async_trait]
impl PollExecutor for SshExecutor {
    async fn execute(&self, node: &NodeDescriptor) -> PollResult<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.ssh_args(&node.host, poll_command(node.kind)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let deadline = self.settings.deadline();
        let output = match tokio::time::timeout(deadline, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(PollError::Command(format!(
                    "Failed to spawn {}: {e}",
                    self.program.display()
                )));
            }
            Err(_) => {
                tracing::trace!(node = %node.name, ?deadline, "ssh deadline exceeded");
                return Err(PollError::Timeout);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        interpret_output(node.kind, output.status.code(), &stdout, &stderr)
    }
}

/// Decides whether a finished `ssh` run counts as a successful poll.
///
/// Status evidence wins over the exit code: a status command that exits
/// non-zero after printing its table or JSON is still a usable poll.
pub fn interpret_output(
    kind: NodeKind,
    exit_code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> PollResult<String> {
    if OutputParser::has_status_evidence(kind, stdout) {
        return Ok(stdout.to_string());
    }

    let stderr = stderr.trim();
    if exit_code == Some(SSH_ERROR_EXIT) {
        let reason = if stderr.is_empty() {
            "connection failed"
        } else {
            stderr
        };
        return Err(PollError::Connection(reason.to_string()));
    }

    let stdout = stdout.trim();
    let reason = [stderr, stdout]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or("no output");
    Err(PollError::MalformedOutput(reason.to_string()))
}
