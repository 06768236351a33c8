//! Instance descriptors reported by the vagrant-shell helper.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Lifecycle state of a compute instance.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum InstanceState {
    #[default]
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
}

impl InstanceState {
    /// True when the instance is up and its ready predicate can pass.
    pub fn is_running(&self) -> bool {
        matches!(self, InstanceState::Running)
    }

    /// True when the instance is stopped or on its way down.
    pub fn is_stopped(&self) -> bool {
        matches!(self, InstanceState::Stopping | InstanceState::Stopped)
    }

    /// True when the instance no longer exists.
    pub fn is_terminated(&self) -> bool {
        matches!(self, InstanceState::ShuttingDown | InstanceState::Terminated)
    }
}

/// Serialized instance descriptor, parsed from the helper's stdout JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstanceHandle {
    /// Provider-side instance identifier.
    pub id: String,
    /// Current lifecycle state.
    #[serde(default)]
    pub state: InstanceState,
    #[serde(default)]
    pub public_ip: Option<String>,
    #[serde(default)]
    pub private_ip: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub availability_zone: Option<String>,
}
