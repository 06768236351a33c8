//! Termination of a machine's instance.

use anyhow::Result;
use tracing::info;

use super::{Action, Env};
use crate::driver::Driver;
use crate::messages;

/// Terminates the instance backing the machine. A machine that was never
/// created is reported and skipped.
pub struct TerminateInstance;

impl Action for TerminateInstance {
    fn name(&self) -> &'static str {
        "terminate-instance"
    }

    fn call(&self, env: &mut Env, driver: &dyn Driver) -> Result<()> {
        let Some(machine_id) = env.machine_id() else {
            info!("{}", messages::not_created());
            return Ok(());
        };

        let instance = driver.show(machine_id)?;
        info!("{}", messages::terminating());
        driver.terminate(&instance.id)
    }
}
