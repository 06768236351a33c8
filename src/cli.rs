use anyhow::Result;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the machine's instance and wait for it to become ready
    Up(UpArgs),

    /// Stop the machine's instance
    Halt(HaltArgs),

    /// Terminate the machine's instance
    Destroy(DestroyArgs),

    /// Validate the YAML provider configuration
    Validate(ValidateArgs),

    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(Args, Debug)]
pub struct UpArgs {
    /// Path to the YAML file defining the provider configuration
    #[arg(short, long, default_value = "shellup.yaml")]
    pub file: Utf8PathBuf,

    /// Machine identifier known to the vagrant-shell helper
    #[arg(short, long)]
    pub machine: String,

    /// Set the log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Do not run, just show what would be done
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct HaltArgs {
    /// Path to the YAML file defining the provider configuration
    #[arg(short, long, default_value = "shellup.yaml")]
    pub file: Utf8PathBuf,

    /// Machine identifier known to the vagrant-shell helper
    #[arg(short, long)]
    pub machine: Option<String>,

    /// Set the log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Do not run, just show what would be done
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct DestroyArgs {
    /// Path to the YAML file defining the provider configuration
    #[arg(short, long, default_value = "shellup.yaml")]
    pub file: Utf8PathBuf,

    /// Machine identifier known to the vagrant-shell helper
    #[arg(short, long)]
    pub machine: Option<String>,

    /// Set the log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Do not run, just show what would be done
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the YAML file to validate
    #[arg(short, long, default_value = "shellup.yaml")]
    pub file: Utf8PathBuf,

    /// Set the log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Represents log levels for controlling the verbosity of logging output.
///
/// Maps directly to the log levels used by the `tracing` crate. Specifying
/// `--log-level debug` enables debug-level output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

pub fn parse_args() -> Result<Cli> {
    Ok(Cli::parse())
}
