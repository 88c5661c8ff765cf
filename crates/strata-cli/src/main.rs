//! Strata CLI
//!
//! Resolves layered configuration and syncs generated artifacts into the
//! project's managed directory.
//!
//! # Environment Variables
//!
//! - `STRATA_HOME`: global configuration directory
//! - `RUST_LOG`: log filter when `--verbose` is not given

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use context::CommandContext;
use error::Result;
use strata_core::SyncOptions;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Install a subscriber on stderr: DEBUG with `--verbose`, otherwise only
/// when `RUST_LOG` is set.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => return,
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{}: could not install logger: {}", "warning".yellow(), e);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command.clone() else {
        println!("{} Layered agent configuration", "strata".green().bold());
        println!();
        println!("Run {} for available commands.", "strata --help".cyan());
        return Ok(());
    };

    let ctx = CommandContext::from_cli(&cli)?;
    execute_command(&ctx, command).await
}

async fn execute_command(ctx: &CommandContext, command: Commands) -> Result<()> {
    match command {
        Commands::Sync {
            dry_run,
            force,
            backup,
            no_backup,
            no_preserve,
            json,
        } => {
            let options = SyncOptions {
                backup: commands::backup_override(backup, no_backup),
                force,
                preserve_user_content: no_preserve.then_some(false),
                dry_run,
            };
            commands::run_sync(ctx, options, json).await
        }
        Commands::Diff { json } => commands::run_diff(ctx, json).await,
        Commands::Validate { json } => commands::run_validate(ctx, json).await,
        Commands::Config { json, layers } => commands::run_config(ctx, json, layers).await,
        Commands::Backup { action } => commands::run_backup(ctx, action).await,
    }
}
