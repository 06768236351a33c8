//! Adapter over the external `vagrant-shell` helper binary.
//!
//! The helper owns all real provisioning work. This module translates
//! driver calls into helper invocations (`show`, `start`, `stop`,
//! `terminate`, `status`, `ssh-ready`) and parses the JSON instance
//! descriptors the helper prints on stdout. The [`Driver`] trait is the
//! seam that lets lifecycle actions run against a scripted fake in tests.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::credentials::{ACCESS_KEY_VAR, SECRET_KEY_VAR, SESSION_TOKEN_VAR};
use crate::error::ShellupError;
use crate::executor::{CommandExecutor, CommandSpec, ExecutionResult, format_command_args};
use crate::instance::{InstanceHandle, InstanceState};

/// Name of the helper binary resolved on `PATH`.
pub const HELPER_COMMAND: &str = "vagrant-shell";

/// External process collaborator managing compute instances.
pub trait Driver: Send + Sync {
    /// Looks up the instance descriptor for a machine identifier.
    fn show(&self, machine_id: &str) -> Result<InstanceHandle>;

    /// Issues a start command for the instance.
    fn start(&self, instance_id: &str) -> Result<()>;

    /// Issues a stop command for the instance.
    fn stop(&self, instance_id: &str) -> Result<()>;

    /// Issues a terminate command for the instance.
    fn terminate(&self, instance_id: &str) -> Result<()>;

    /// Polls the instance's ready predicate. Errors are treated as
    /// transient by callers and retried within their budget.
    fn is_ready(&self, instance_id: &str) -> Result<bool>;

    /// Polls the remote-access-channel readiness predicate.
    fn is_ssh_ready(&self, instance_id: &str) -> Result<bool>;
}

/// Adds a flag and its corresponding value to the argument list if the
/// value is not empty.
fn add_flag(args: &mut Vec<String>, flag: &str, value: &str) {
    if !value.is_empty() {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

/// [`Driver`] implementation shelling out to the `vagrant-shell` helper.
pub struct ShellDriver {
    executor: Arc<dyn CommandExecutor>,
    config: ProviderConfig,
}

impl ShellDriver {
    /// Creates a driver bound to an effective (region-resolved)
    /// configuration.
    pub fn new(executor: Arc<dyn CommandExecutor>, config: ProviderConfig) -> Self {
        Self { executor, config }
    }

    /// Global flags placed before the subcommand.
    fn base_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        add_flag(&mut args, "--region", self.config.region_name());
        if let Some(endpoint) = self.config.endpoint.as_option() {
            add_flag(&mut args, "--endpoint", endpoint);
        }
        if let Some(version) = self.config.version.as_option() {
            add_flag(&mut args, "--version", version);
        }
        args
    }

    /// Builds the full command spec: configured environment first, then
    /// resolved credentials.
    fn spec(&self, args: Vec<String>) -> CommandSpec {
        let mut spec =
            CommandSpec::new(HELPER_COMMAND, args).with_envs(self.config.environment.clone());
        if let Some(key) = self.config.access_key.as_option() {
            spec = spec.with_env(ACCESS_KEY_VAR, key);
        }
        if let Some(key) = self.config.secret_key.as_option() {
            spec = spec.with_env(SECRET_KEY_VAR, key);
        }
        if let Some(token) = self.config.session_token.as_option() {
            spec = spec.with_env(SESSION_TOKEN_VAR, token);
        }
        spec
    }

    fn run(&self, subcommand: &str, id: &str) -> Result<ExecutionResult> {
        let mut args = self.base_args();
        args.push(subcommand.to_string());
        args.push(id.to_string());
        let spec = self.spec(args);

        debug!("{} {}", HELPER_COMMAND, format_command_args(&spec.args));
        let result = self.executor.execute(&spec)?;
        if !result.success() {
            return Err(ShellupError::Execution {
                command: format!("{} {}", HELPER_COMMAND, format_command_args(&spec.args)),
                status: result
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            }
            .into());
        }
        Ok(result)
    }

    fn parse_descriptor(&self, result: &ExecutionResult, id: &str) -> Result<InstanceHandle> {
        // Dry-run executions produce no output; report a synthetic
        // running instance so the rest of the plan can be shown.
        if result.status.is_none() {
            return Ok(InstanceHandle {
                id: id.to_string(),
                state: InstanceState::Running,
                public_ip: None,
                private_ip: None,
                image: None,
                instance_type: None,
                availability_zone: None,
            });
        }
        serde_json::from_str(result.stdout.trim()).with_context(|| {
            format!("failed to parse instance descriptor from `{} show`", HELPER_COMMAND)
        })
    }
}

impl Driver for ShellDriver {
    fn show(&self, machine_id: &str) -> Result<InstanceHandle> {
        let result = self.run("show", machine_id)?;
        self.parse_descriptor(&result, machine_id)
    }

    fn start(&self, instance_id: &str) -> Result<()> {
        self.run("start", instance_id)?;
        Ok(())
    }

    fn stop(&self, instance_id: &str) -> Result<()> {
        self.run("stop", instance_id)?;
        Ok(())
    }

    fn terminate(&self, instance_id: &str) -> Result<()> {
        self.run("terminate", instance_id)?;
        Ok(())
    }

    fn is_ready(&self, instance_id: &str) -> Result<bool> {
        let result = self.run("status", instance_id)?;
        let handle = self.parse_descriptor(&result, instance_id)?;
        Ok(handle.state.is_running())
    }

    fn is_ssh_ready(&self, instance_id: &str) -> Result<bool> {
        let mut args = self.base_args();
        args.push("ssh-ready".to_string());
        args.push(instance_id.to_string());
        let spec = self.spec(args);

        // Non-zero exit means "not yet ready", not a failure; only spawn
        // and wait problems surface as errors.
        let result = self.executor.execute(&spec)?;
        Ok(result.success())
    }
}
