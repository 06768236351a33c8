//! Domain-specific error types for shellup.
//!
//! This module defines `ShellupError`, a `thiserror`-based enum that
//! provides typed error variants for common failure modes. Public API
//! functions return `Result<T, ShellupError>` for programmatic error
//! handling, while trait boundaries continue to use `anyhow::Result`.
//!
//! `ShellupError` implements `Into<anyhow::Error>`, so the `?` operator
//! converts it automatically at trait boundaries that return `anyhow::Result`.

use std::io;

/// Formats an IO error kind into a human-readable message.
///
/// Provides consistent messages for common IO error kinds
/// (e.g., "I/O error: not found") instead of the OS-level messages
/// (e.g., "No such file or directory (os error 2)"). For unrecognized
/// error kinds, falls back to including the OS-level error message
/// directly.
pub(crate) fn io_error_kind_message(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "I/O error: not found".to_string(),
        io::ErrorKind::PermissionDenied => "I/O error: permission denied".to_string(),
        io::ErrorKind::IsADirectory => "I/O error: is a directory".to_string(),
        _ => format!("I/O error: {}", err),
    }
}

/// Domain-specific error type for shellup.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShellupError {
    /// A validation constraint was violated.
    #[error("validation error: {0}")]
    Validation(String),

    /// An API contract was used out of order (programmer error, not
    /// user-recoverable). Raised for example when a region config is
    /// requested from a configuration that was never finalized.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// The instance did not report ready within the configured budget.
    ///
    /// Carries the configured timeout in seconds, not the attempt count,
    /// so the user sees the value they set.
    #[error("instance did not become ready within {timeout} seconds")]
    InstanceReadyTimeout {
        /// The configured `instance_ready_timeout`, in seconds.
        timeout: u64,
    },

    /// A helper command execution failed (non-zero exit, spawn failure,
    /// wait failure, thread panic, etc.).
    #[error("command execution failed: {command}: {status}")]
    Execution {
        /// The command that was executed.
        command: String,
        /// Human-readable reason for the failure.
        status: String,
    },

    /// A configuration file could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O operation failed with contextual information.
    #[error("{context}: {message}")]
    Io {
        /// What was being done when the error occurred, typically a path.
        context: String,
        /// Human-readable description derived from [`io_error_kind_message`].
        message: String,
        /// The underlying I/O error, preserved for programmatic inspection.
        #[source]
        source: std::io::Error,
    },
}

impl ShellupError {
    /// Creates an `Io` variant with the `message` field automatically derived
    /// from the `source` via [`io_error_kind_message`].
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: io_error_kind_message(&source),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = ShellupError::Validation("region is required".to_string());
        assert_eq!(err.to_string(), "validation error: region is required");
    }

    #[test]
    fn test_precondition_display() {
        let err = ShellupError::Precondition(
            "get_region_config called before finalize".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "precondition violated: get_region_config called before finalize"
        );
    }

    #[test]
    fn test_instance_ready_timeout_display() {
        let err = ShellupError::InstanceReadyTimeout { timeout: 120 };
        assert_eq!(err.to_string(), "instance did not become ready within 120 seconds");
    }

    #[test]
    fn test_execution_display() {
        let err = ShellupError::Execution {
            command: "vagrant-shell".to_string(),
            status: "exit status: 1".to_string(),
        };
        assert_eq!(err.to_string(), "command execution failed: vagrant-shell: exit status: 1");
    }

    #[test]
    fn test_config_display() {
        let err = ShellupError::Config("YAML parse error at line 3".to_string());
        assert_eq!(err.to_string(), "configuration error: YAML parse error at line 3");
    }

    #[test]
    fn test_io_display() {
        let source = io::Error::new(io::ErrorKind::NotFound, "entity not found");
        let err = ShellupError::io("/path/to/config.yml", source);
        assert_eq!(err.to_string(), "/path/to/config.yml: I/O error: not found");
    }

    #[test]
    fn test_io_source_preserved() {
        let source = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = ShellupError::io("/etc/shellup.yaml", source);
        match &err {
            ShellupError::Io { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_io_error_kind_message_other() {
        let err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        let msg = io_error_kind_message(&err);
        assert!(msg.starts_with("I/O error: "));
    }

    #[test]
    fn test_into_anyhow_error() {
        let err = ShellupError::InstanceReadyTimeout { timeout: 60 };
        let anyhow_err: anyhow::Error = err.into();
        let downcast = anyhow_err.downcast_ref::<ShellupError>();
        assert!(matches!(
            downcast,
            Some(ShellupError::InstanceReadyTimeout { timeout: 60 })
        ));
    }
}
