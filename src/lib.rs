pub mod action;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod driver;
pub mod error;
pub mod executor;
pub mod instance;
pub mod messages;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result, bail};
use camino::Utf8Path;
use tracing::{debug, info};
use tracing_subscriber::{FmtSubscriber, filter::LevelFilter};

use crate::action::{Action, Env, HaltInstance, StartInstance, TerminateInstance};
use crate::config::ProviderConfig;
use crate::driver::ShellDriver;
use crate::executor::CommandExecutor;

pub use crate::error::ShellupError;

pub fn init_logging(log_level: cli::LogLevel) -> Result<()> {
    let filter = match log_level {
        cli::LogLevel::Trace => LevelFilter::TRACE,
        cli::LogLevel::Debug => LevelFilter::DEBUG,
        cli::LogLevel::Info => LevelFilter::INFO,
        cli::LogLevel::Warn => LevelFilter::WARN,
        cli::LogLevel::Error => LevelFilter::ERROR,
    };

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(filter).finish(),
    )
    .context("failed to set global default tracing subscriber")
}

/// Loads and finalizes the provider configuration.
fn load_finalized_config(path: &Utf8Path) -> Result<ProviderConfig> {
    let mut config = config::load_config(path)
        .with_context(|| format!("failed to load configuration from {}", path))?;
    config.finalize();
    Ok(config)
}

/// Formats aggregated validation errors under the provider-section label.
fn format_validation_errors(errors: &[String]) -> String {
    let mut out = String::from("Shell Provider configuration is invalid:");
    for error in errors {
        out.push_str("\n* ");
        out.push_str(error);
    }
    out
}

/// Resolves the effective per-region configuration and builds the driver.
fn build_driver(
    config: &ProviderConfig,
    executor: Arc<dyn CommandExecutor>,
) -> Result<ShellDriver> {
    let effective = config.get_region_config(config.region_name())?.clone();
    Ok(ShellDriver::new(executor, effective))
}

fn run_actions(
    actions: Vec<Box<dyn Action>>,
    machine_id: Option<String>,
    config: ProviderConfig,
    executor: Arc<dyn CommandExecutor>,
    interrupted: Arc<AtomicBool>,
) -> Result<()> {
    let errors = config.validate();
    if !errors.is_empty() {
        bail!(format_validation_errors(&errors));
    }

    let driver = build_driver(&config, executor)?;
    let mut env = Env::new(machine_id, config).with_interrupt_flag(interrupted);
    action::run_chain(&actions, &mut env, &driver)?;

    for (name, elapsed) in &env.metrics {
        debug!("{}: {:.2}s", name, elapsed.as_secs_f64());
    }
    Ok(())
}

pub fn run_up(
    opts: &cli::UpArgs,
    executor: Arc<dyn CommandExecutor>,
    interrupted: Arc<AtomicBool>,
) -> Result<()> {
    let config = load_finalized_config(opts.file.as_path())?;
    run_actions(
        vec![Box::new(StartInstance::new())],
        Some(opts.machine.clone()),
        config,
        executor,
        interrupted,
    )
}

pub fn run_halt(
    opts: &cli::HaltArgs,
    executor: Arc<dyn CommandExecutor>,
    interrupted: Arc<AtomicBool>,
) -> Result<()> {
    let config = load_finalized_config(opts.file.as_path())?;
    run_actions(
        vec![Box::new(HaltInstance)],
        opts.machine.clone(),
        config,
        executor,
        interrupted,
    )
}

pub fn run_destroy(
    opts: &cli::DestroyArgs,
    executor: Arc<dyn CommandExecutor>,
    interrupted: Arc<AtomicBool>,
) -> Result<()> {
    let config = load_finalized_config(opts.file.as_path())?;
    run_actions(
        vec![Box::new(TerminateInstance)],
        opts.machine.clone(),
        config,
        executor,
        interrupted,
    )
}

pub fn run_validate(opts: &cli::ValidateArgs) -> Result<()> {
    let config = load_finalized_config(opts.file.as_path())?;
    let errors = config.validate();
    if !errors.is_empty() {
        bail!(format_validation_errors(&errors));
    }
    info!("validation successful:\n{:#?}", config);
    Ok(())
}
