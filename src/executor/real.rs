//! Real command executor implementation.
//!
//! This module provides [`RealCommandExecutor`], which executes the helper
//! binary using `std::process::Command`, capturing stdout for the caller
//! and streaming stderr to the log in real time.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use which::which;

use super::pipe::{panic_message, read_stderr_to_log};
use super::{CommandExecutor, CommandSpec, ExecutionResult, format_command_args};

/// Cleans up a child process and its associated reader threads.
///
/// Kills the child process, waits for it to terminate, and joins reader
/// threads to prevent resource leaks. Called from error paths in
/// [`RealCommandExecutor::execute()`].
fn cleanup_child_process<I>(child: &mut Child, handles: I)
where
    I: IntoIterator<Item = JoinHandle<()>>,
{
    let pid = child.id();
    if let Err(e) = child.kill() {
        tracing::debug!(pid = pid, "kill returned error (process may have already exited): {}", e);
    }
    if let Err(e) = child.wait() {
        tracing::warn!(pid = pid, "failed to wait for child process after kill: {}", e);
    }
    for handle in handles {
        if let Err(e) = handle.join() {
            tracing::warn!("reader thread panicked during cleanup: {}", panic_message(&*e));
        }
    }
}

fn execution_error(spec: &CommandSpec, status: String) -> anyhow::Error {
    crate::error::ShellupError::Execution {
        command: format!("{} {}", spec.command, format_command_args(&spec.args)),
        status,
    }
    .into()
}

/// Command executor that runs the actual helper binary.
///
/// When `dry_run` is true, commands are logged but not executed,
/// and `execute()` returns `Ok(ExecutionResult { status: None, .. })`.
pub struct RealCommandExecutor {
    pub dry_run: bool,
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
        if self.dry_run {
            tracing::info!("dry run: {:?}", spec);
            return Ok(ExecutionResult {
                status: None,
                stdout: String::new(),
            });
        }

        let cmd =
            which(&spec.command).with_context(|| format!("command not found: {}", spec.command))?;
        tracing::trace!("command found: {}: {}", spec.command, cmd.to_string_lossy());

        let mut command = Command::new(cmd);
        command.args(&spec.args);

        if let Some(ref cwd) = spec.cwd {
            command.current_dir(cwd);
        }

        for (key, value) in &spec.env {
            command.env(key, value);
        }

        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = command.spawn().with_context(|| {
            format!("failed to spawn command `{}` with args {:?}", spec.command, spec.args)
        })?;

        tracing::trace!("spawned command: {}: pid={}", spec.command, child.id());

        let stderr_pipe = child.stderr.take();
        let stderr_handle = match thread::Builder::new()
            .name("stderr-reader".to_string())
            .spawn(move || read_stderr_to_log(stderr_pipe))
        {
            Ok(handle) => handle,
            Err(e) => {
                cleanup_child_process(&mut child, []);
                return Err(execution_error(
                    spec,
                    format!("failed to spawn stderr reader thread: {}", e),
                ));
            }
        };

        // Stdout is read to completion on this thread; the helper's
        // descriptors are small, so there is no back-pressure concern.
        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            if let Err(e) = pipe.read_to_string(&mut stdout) {
                cleanup_child_process(&mut child, [stderr_handle]);
                return Err(execution_error(spec, format!("failed to read stdout: {}", e)));
            }
        }

        let status = match child.wait() {
            Ok(s) => s,
            Err(e) => {
                // If waiting fails, the process might still be running.
                // Kill it and clean up threads to prevent resource leaks.
                cleanup_child_process(&mut child, [stderr_handle]);
                return Err(execution_error(spec, format!("failed to wait for command: {}", e)));
            }
        };

        if let Err(e) = stderr_handle.join() {
            let msg = panic_message(&*e).to_string();
            tracing::error!(stream = "stderr", panic = %msg, "reader thread panicked");
            return Err(execution_error(
                spec,
                format!("stderr reader thread panicked during command execution: {}", msg),
            ));
        }

        tracing::trace!("executed command: {}: success={}", spec.command, status.success());

        Ok(ExecutionResult {
            status: Some(status),
            stdout,
        })
    }
}
