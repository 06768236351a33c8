//! Internal utilities for streaming helper stderr to logs.
//!
//! Stdout carries the helper's machine-readable output and is captured by
//! the executor; stderr carries progress and diagnostics and is logged
//! line by line in real time from a reader thread.

use std::io::{BufRead, BufReader, Read};

/// Extracts a human-readable message from a thread panic.
///
/// The returned `&str` borrows from the panic payload, so it is valid
/// as long as the `err` reference is valid.
pub(super) fn panic_message(err: &(dyn std::any::Any + Send)) -> &str {
    err.downcast_ref::<&str>()
        .copied()
        .or_else(|| err.downcast_ref::<String>().map(|s| s.as_str()))
        .unwrap_or("unknown panic")
}

/// Reads the helper's stderr pipe and logs each line in real time.
///
/// - Lines are logged at WARN level so helper diagnostics remain visible
///   while an instance is booting.
/// - Binary data uses lossy UTF-8 conversion.
/// - I/O errors stop reading but don't fail command execution
///   (streaming is best-effort; command success is determined by exit status).
/// - `None` pipe logs an error and returns (unexpected if `Stdio::piped()` was set).
pub(super) fn read_stderr_to_log<R: Read>(pipe: Option<R>) {
    let Some(pipe) = pipe else {
        tracing::error!(
            "stderr pipe was None (unexpected: Stdio::piped() was set), no output will be captured"
        );
        return;
    };

    let mut reader = BufReader::new(pipe);
    let mut line_buf = Vec::new();

    loop {
        line_buf.clear();
        match reader.read_until(b'\n', &mut line_buf) {
            Ok(0) => break, // EOF
            Ok(_) => {
                let line = line_buf.strip_suffix(b"\n").unwrap_or(&line_buf);
                let text = String::from_utf8_lossy(line);
                // Trailing CR is trimmed to handle CRLF line endings.
                tracing::warn!(stream = "stderr", "{}", text.trim_end_matches('\r'));
            }
            Err(e) => {
                tracing::error!(stream = "stderr", error = %e, "I/O error, stopping read");
                break;
            }
        }
    }
}
