// runner.rs — Run one command to completion under a hard timeout.
//
// stdout and stderr are drained on reader threads while the child runs so a
// chatty process cannot fill a pipe and deadlock the wait. Captured output is
// bounded; bytes past the limit are read and discarded.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use wait_timeout::ChildExt;

use crate::error::CommandError;

/// Default wall-clock budget for a single command (5 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Default cap on captured bytes per stream.
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 1_000_000;

const READER_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How a command finished.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandStatus {
    /// Exited with the given code (None if killed by a signal).
    Exited { code: Option<i32> },
    /// Killed after exceeding the timeout.
    TimedOut { timeout_secs: u64 },
    /// Could not be started.
    SpawnFailed { message: String },
}

/// Result of running one command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandOutcome {
    /// The command line as shown in logs and errors.
    pub command: String,
    pub status: CommandStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        matches!(self.status, CommandStatus::Exited { code: Some(0) })
    }

    pub fn timed_out(&self) -> bool {
        matches!(self.status, CommandStatus::TimedOut { .. })
    }

    /// The failure this outcome represents, if any.
    pub fn error(&self) -> Option<CommandError> {
        match &self.status {
            CommandStatus::Exited { code: Some(0) } => None,
            CommandStatus::Exited { code } => Some(CommandError::NonZeroExit {
                command: self.command.clone(),
                code: *code,
                stderr: failure_text(&self.stderr, &self.stdout, *code),
            }),
            CommandStatus::TimedOut { timeout_secs } => Some(CommandError::Timeout {
                command: self.command.clone(),
                timeout_secs: *timeout_secs,
            }),
            CommandStatus::SpawnFailed { message } => Some(CommandError::Spawn {
                command: self.command.clone(),
                message: message.clone(),
            }),
        }
    }

    /// Convert into a `Result`, keeping the outcome on success.
    pub fn into_result(self) -> Result<CommandOutcome, CommandError> {
        match self.error() {
            None => Ok(self),
            Some(err) => Err(err),
        }
    }
}

/// Executes commands with a timeout and bounded output capture.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
    output_limit_bytes: usize,
    shell: String,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
            shell: "sh".to_string(),
        }
    }
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output_limit(mut self, bytes: usize) -> Self {
        self.output_limit_bytes = bytes;
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a shell command line in `cwd`. `timeout` overrides the runner default.
    pub fn run(&self, command: &str, cwd: &Path, timeout: Option<Duration>) -> CommandOutcome {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(command).current_dir(cwd);
        self.execute(command.to_string(), cmd, timeout.unwrap_or(self.timeout))
    }

    /// Run a program directly (no shell) in `cwd` with the runner's default timeout.
    pub fn run_program(&self, program: &str, args: &[&str], cwd: &Path) -> CommandOutcome {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(cwd);
        let label = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.execute(label, cmd, self.timeout)
    }

    fn execute(&self, label: String, mut cmd: Command, timeout: Duration) -> CommandOutcome {
        let started = Instant::now();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group, so a timeout can take down grandchildren that
        // would otherwise keep the output pipes open.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        tracing::debug!(command = %label, timeout_secs = timeout.as_secs(), "spawning command");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(command = %label, err = %e, "failed to spawn command");
                return CommandOutcome {
                    command: label,
                    status: CommandStatus::SpawnFailed {
                        message: e.to_string(),
                    },
                    stdout: String::new(),
                    stderr: String::new(),
                    duration_ms: elapsed_ms(started),
                };
            }
        };

        let limit = self.output_limit_bytes;
        let stdout_handle = child
            .stdout
            .take()
            .map(|s| thread::spawn(move || read_stream_limited(s, limit)));
        let stderr_handle = child
            .stderr
            .take()
            .map(|s| thread::spawn(move || read_stream_limited(s, limit)));

        let status = match child.wait_timeout(timeout) {
            Ok(Some(status)) => CommandStatus::Exited {
                code: status.code(),
            },
            Ok(None) => {
                tracing::warn!(
                    command = %label,
                    timeout_secs = timeout.as_secs(),
                    "command timed out, killing"
                );
                kill_process_tree(&mut child, &label);
                // Reap so the child does not linger as a zombie.
                let _ = child.wait();
                CommandStatus::TimedOut {
                    timeout_secs: timeout.as_secs(),
                }
            }
            Err(e) => {
                tracing::error!(command = %label, err = %e, "failed waiting for command");
                kill_process_tree(&mut child, &label);
                let _ = child.wait();
                CommandStatus::Exited { code: None }
            }
        };

        // Background descendants can outlive the shell and hold the pipes
        // open. They get whatever is left of the budget, then the group dies.
        let timed_out = matches!(status, CommandStatus::TimedOut { .. });
        let deadline = started.checked_add(timeout);
        if !timed_out
            && deadline.is_some_and(|deadline| {
                !readers_finished_by(&[&stdout_handle, &stderr_handle], deadline)
            })
        {
            tracing::warn!(
                command = %label,
                "output still open at deadline, killing remaining processes"
            );
            kill_process_group(&child);
        }

        let stdout = join_output(stdout_handle);
        let stderr = join_output(stderr_handle);

        let outcome = CommandOutcome {
            command: label,
            status,
            stdout,
            stderr,
            duration_ms: elapsed_ms(started),
        };
        tracing::debug!(
            command = %outcome.command,
            status = ?outcome.status,
            duration_ms = outcome.duration_ms,
            "command finished"
        );
        outcome
    }
}

fn kill_process_tree(child: &mut Child, label: &str) {
    kill_process_group(child);
    if let Err(e) = child.kill() {
        tracing::debug!(command = %label, err = %e, "kill after group signal");
    }
}

/// SIGKILL every process in the child's group. The group id stays reserved
/// while any member lives, so this is safe after the leader was reaped.
fn kill_process_group(child: &Child) {
    #[cfg(unix)]
    if let Ok(pid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: signalling our own child's process group; no memory is touched.
        unsafe {
            libc::kill(-pid, libc::SIGKILL);
        }
    }
    #[cfg(not(unix))]
    let _ = child;
}

type OutputHandle = Option<thread::JoinHandle<std::io::Result<Vec<u8>>>>;

/// Wait until every reader hit EOF, or until `deadline`. True if they all did.
fn readers_finished_by(handles: &[&OutputHandle], deadline: Instant) -> bool {
    loop {
        if handles.iter().filter_map(|h| h.as_ref()).all(|h| h.is_finished()) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(READER_POLL_INTERVAL);
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn join_output(handle: OutputHandle) -> String {
    let Some(handle) = handle else {
        return String::new();
    };
    match handle.join() {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(e)) => {
            tracing::warn!(err = %e, "failed reading command output");
            String::new()
        }
        Err(_) => {
            tracing::warn!("output reader thread panicked");
            String::new()
        }
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        let keep = n.min(remaining);
        buf.extend_from_slice(&chunk[..keep]);
        truncated += n - keep;
    }

    if truncated > 0 {
        tracing::warn!(truncated, "command output truncated");
    }
    Ok(buf)
}

/// Pick the most useful text to explain a failure.
fn failure_text(stderr: &str, stdout: &str, code: Option<i32>) -> String {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn captures_stdout_of_successful_command() {
        let dir = tempdir().unwrap();
        let outcome = CommandRunner::new().run("echo hello", dir.path(), None);
        assert!(outcome.success());
        assert_eq!(outcome.stdout.trim(), "hello");
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn non_zero_exit_reports_stderr() {
        let dir = tempdir().unwrap();
        let outcome = CommandRunner::new().run("echo boom >&2; exit 3", dir.path(), None);
        assert!(!outcome.success());
        assert_eq!(outcome.status, CommandStatus::Exited { code: Some(3) });
        let err = outcome.into_result().unwrap_err();
        assert_eq!(
            err,
            CommandError::NonZeroExit {
                command: "echo boom >&2; exit 3".to_string(),
                code: Some(3),
                stderr: "boom".to_string(),
            }
        );
        assert_eq!(err.to_string(), "Command failed: echo boom >&2; exit 3: boom");
    }

    #[test]
    fn timeout_kills_the_command() {
        let dir = tempdir().unwrap();
        let started = Instant::now();
        let outcome =
            CommandRunner::new().run("sleep 5", dir.path(), Some(Duration::from_millis(200)));
        assert!(outcome.timed_out());
        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(matches!(outcome.error(), Some(CommandError::Timeout { .. })));
    }

    #[test]
    fn background_children_cannot_hold_the_command_past_its_timeout() {
        let dir = tempdir().unwrap();
        let started = Instant::now();
        let outcome = CommandRunner::new().run(
            "sleep 8 & echo started",
            dir.path(),
            Some(Duration::from_secs(1)),
        );
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(outcome.success());
        assert_eq!(outcome.stdout.trim(), "started");
    }

    #[test]
    fn runs_in_the_given_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();
        let outcome = CommandRunner::new().run("cat marker.txt", dir.path(), None);
        assert_eq!(outcome.stdout, "here");
    }

    #[test]
    fn missing_program_is_a_spawn_failure() {
        let dir = tempdir().unwrap();
        let outcome =
            CommandRunner::new().run_program("definitely-not-a-real-binary-42", &[], dir.path());
        assert!(matches!(outcome.status, CommandStatus::SpawnFailed { .. }));
        assert!(matches!(outcome.error(), Some(CommandError::Spawn { .. })));
    }

    #[test]
    fn output_is_truncated_at_limit() {
        let dir = tempdir().unwrap();
        let outcome = CommandRunner::new()
            .with_output_limit(10)
            .run("printf '0123456789abcdef'", dir.path(), None);
        assert!(outcome.success());
        assert_eq!(outcome.stdout, "0123456789");
    }

    #[test]
    fn program_label_joins_arguments() {
        let dir = tempdir().unwrap();
        let outcome = CommandRunner::new().run_program("echo", &["a", "b"], dir.path());
        assert_eq!(outcome.command, "echo a b");
        assert_eq!(outcome.stdout.trim(), "a b");
    }
}
