//! User-facing message catalog.
//!
//! Lifecycle actions look their progress and error strings up here rather
//! than embedding wording inline, so the set of message occasions stays
//! in one place.

pub fn starting() -> &'static str {
    "Starting the instance..."
}

pub fn waiting_for_ready() -> &'static str {
    "Waiting for instance to become \"ready\"..."
}

pub fn waiting_for_ssh() -> &'static str {
    "Waiting for SSH to become available..."
}

pub fn ready() -> &'static str {
    "Machine is booted and ready for use!"
}

pub fn stopping() -> &'static str {
    "Stopping the instance..."
}

pub fn already_stopped() -> &'static str {
    "The instance is already stopped."
}

pub fn terminating() -> &'static str {
    "Terminating the instance..."
}

pub fn not_created() -> &'static str {
    "Instance is not created. Please run `shellup up` first."
}
