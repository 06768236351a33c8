use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::CommandFactory;
use tracing::error;

use shellup::cli::{self, Cli, Commands};
use shellup::executor::RealCommandExecutor;

fn main() -> Result<()> {
    let args = cli::parse_args()?;

    let log_level = match &args.command {
        Commands::Up(opts) => opts.log_level,
        Commands::Halt(opts) => opts.log_level,
        Commands::Destroy(opts) => opts.log_level,
        Commands::Validate(opts) => opts.log_level,
        Commands::Completion(_) => cli::LogLevel::Info,
    };
    shellup::init_logging(log_level)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = interrupted.clone();
        let _ = ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        });
    }

    let result = match &args.command {
        Commands::Up(opts) => {
            let executor = Arc::new(RealCommandExecutor { dry_run: opts.dry_run });
            shellup::run_up(opts, executor, interrupted.clone())
        }
        Commands::Halt(opts) => {
            let executor = Arc::new(RealCommandExecutor { dry_run: opts.dry_run });
            shellup::run_halt(opts, executor, interrupted.clone())
        }
        Commands::Destroy(opts) => {
            let executor = Arc::new(RealCommandExecutor { dry_run: opts.dry_run });
            shellup::run_destroy(opts, executor, interrupted.clone())
        }
        Commands::Validate(opts) => shellup::run_validate(opts),
        Commands::Completion(opts) => {
            clap_complete::generate(
                opts.shell,
                &mut Cli::command(),
                env!("CARGO_PKG_NAME"),
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }

    Ok(())
}
