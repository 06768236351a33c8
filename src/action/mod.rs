//! Lifecycle actions and the sequential chain that runs them.
//!
//! Each command (`up`, `halt`, `destroy`) is expressed as an ordered list
//! of [`Action`]s running against a shared [`Env`]. Actions talk to the
//! provider exclusively through the [`Driver`](crate::driver::Driver)
//! seam, which keeps them testable without the helper binary.

mod destroy;
mod halt;
mod ready;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::driver::Driver;

pub use destroy::TerminateInstance;
pub use halt::HaltInstance;
pub use ready::{INSTANCE_READY_METRIC, SSH_READY_METRIC, StartInstance};

/// Shared state carried through an action chain.
///
/// Mirrors the host-framework contract: a machine identifier, the
/// finalized provider configuration, a cooperative interruption flag
/// checked at wait-loop heads, and a metrics map the readiness poller
/// populates with elapsed wait times.
pub struct Env {
    machine_id: Option<String>,
    /// Finalized top-level provider configuration.
    pub config: ProviderConfig,
    interrupted: Arc<AtomicBool>,
    /// Elapsed wait durations keyed by metric name.
    pub metrics: BTreeMap<String, Duration>,
}

impl Env {
    /// Creates an environment for one chain run.
    pub fn new(machine_id: Option<String>, config: ProviderConfig) -> Self {
        Self {
            machine_id,
            config,
            interrupted: Arc::new(AtomicBool::new(false)),
            metrics: BTreeMap::new(),
        }
    }

    /// Shares an externally owned interruption flag (e.g. one set from a
    /// Ctrl-C handler).
    #[must_use]
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    /// The machine identifier, if the machine exists.
    pub fn machine_id(&self) -> Option<&str> {
        self.machine_id.as_deref()
    }

    /// True once the user has requested cancellation. Wait loops check
    /// this at their heads and exit cleanly; interruption is not an error.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

/// A single stage of a lifecycle command.
pub trait Action {
    /// Stable name used in logs and error context.
    fn name(&self) -> &'static str;

    /// Runs the stage. Returning an error aborts the remainder of the chain.
    fn call(&self, env: &mut Env, driver: &dyn Driver) -> Result<()>;
}

/// Runs actions in order, aborting on the first error.
pub fn run_chain(actions: &[Box<dyn Action>], env: &mut Env, driver: &dyn Driver) -> Result<()> {
    for action in actions {
        debug!("running action: {}", action.name());
        action
            .call(env, driver)
            .with_context(|| format!("action {} failed", action.name()))?;
    }
    Ok(())
}
