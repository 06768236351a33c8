//! Instance start and readiness polling.
//!
//! [`StartInstance`] issues a start command and then blocks, under a
//! bounded retry budget, until the instance reports ready and its SSH
//! channel answers. Elapsed time for each phase is recorded into the
//! environment's metrics map.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info};

use super::{Action, Env};
use crate::driver::Driver;
use crate::error::ShellupError;
use crate::messages;

/// Metrics key for the instance-ready wait duration.
pub const INSTANCE_READY_METRIC: &str = "instance_ready_time";
/// Metrics key for the SSH-ready wait duration.
pub const SSH_READY_METRIC: &str = "instance_ssh_time";

/// Fixed sub-interval between ready-predicate attempts, in seconds.
/// The retry budget is derived from this value; see [`StartInstance`].
const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Starts the machine's instance and waits for it to become usable.
///
/// The retry budget is `instance_ready_timeout / 2` attempts against the
/// fixed 2-second sub-interval. The formula is kept as-is: changing the
/// sub-interval without revisiting the divisor would silently change the
/// effective timeout.
pub struct StartInstance {
    poll_interval: Duration,
    ssh_poll_interval: Option<Duration>,
}

impl StartInstance {
    pub fn new() -> Self {
        Self {
            poll_interval: READY_POLL_INTERVAL,
            ssh_poll_interval: None,
        }
    }

    /// Overrides the sleep between ready-predicate attempts. The attempt
    /// budget is unaffected. Intended for tests.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overrides the sleep between SSH readiness checks. Intended for tests.
    #[must_use]
    pub fn with_ssh_poll_interval(mut self, interval: Duration) -> Self {
        self.ssh_poll_interval = Some(interval);
        self
    }
}

impl Default for StartInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for StartInstance {
    fn name(&self) -> &'static str {
        "start-instance"
    }

    fn call(&self, env: &mut Env, driver: &dyn Driver) -> Result<()> {
        let Some(machine_id) = env.machine_id().map(str::to_string) else {
            return Err(ShellupError::Precondition(
                "start requires a machine identifier".to_string(),
            )
            .into());
        };

        let instance = driver.show(&machine_id)?;
        info!("{}", messages::starting());
        driver.start(&instance.id)?;
        let boot_started = Instant::now();

        let region = env.config.region_name().to_string();
        let region_config = env.config.get_region_config(&region)?;
        let timeout = region_config.ready_timeout_secs();
        let check_interval = Duration::from_secs(region_config.check_interval_secs());

        let attempts = timeout / 2;

        info!("{}", messages::waiting_for_ready());
        let mut ready = false;
        for attempt in 1..=attempts {
            if env.is_interrupted() {
                break;
            }
            match driver.is_ready(&instance.id) {
                Ok(true) => {
                    ready = true;
                    break;
                }
                Ok(false) => {}
                // Transient failures are retried silently up to the budget;
                // only budget exhaustion becomes user-visible.
                Err(e) => debug!("ready check attempt {}/{} failed: {:#}", attempt, attempts, e),
            }
            thread::sleep(self.poll_interval);
        }

        if !ready && !env.is_interrupted() {
            return Err(ShellupError::InstanceReadyTimeout { timeout }.into());
        }
        env.metrics
            .insert(INSTANCE_READY_METRIC.to_string(), boot_started.elapsed());

        if !env.is_interrupted() {
            info!("{}", messages::waiting_for_ssh());
            let interval = self.ssh_poll_interval.unwrap_or(check_interval);
            let ssh_started = Instant::now();
            loop {
                if env.is_interrupted() {
                    break;
                }
                if driver.is_ssh_ready(&instance.id)? {
                    break;
                }
                thread::sleep(interval);
            }
            env.metrics
                .insert(SSH_READY_METRIC.to_string(), ssh_started.elapsed());
            if !env.is_interrupted() {
                info!("{}", messages::ready());
            }
        }

        Ok(())
    }
}
