//! Graceful stop of a machine's instance.

use anyhow::Result;
use tracing::info;

use super::{Action, Env};
use crate::driver::Driver;
use crate::messages;

/// Stops the instance backing the machine, skipping instances that are
/// already stopped or never created.
pub struct HaltInstance;

impl Action for HaltInstance {
    fn name(&self) -> &'static str {
        "halt-instance"
    }

    fn call(&self, env: &mut Env, driver: &dyn Driver) -> Result<()> {
        let Some(machine_id) = env.machine_id() else {
            info!("{}", messages::not_created());
            return Ok(());
        };

        let instance = driver.show(machine_id)?;
        if instance.state.is_stopped() {
            info!("{}", messages::already_stopped());
            return Ok(());
        }

        info!("{}", messages::stopping());
        driver.stop(&instance.id)
    }
}
