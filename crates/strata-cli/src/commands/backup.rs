//! Backup command implementations
//!
//! Snapshots live under `.strata/backups/` and cover the whole managed
//! directory of the effective configuration.

use colored::Colorize;

use strata_core::BackupManager;

use crate::cli::BackupAction;
use crate::context::CommandContext;
use crate::error::Result;

async fn manager(ctx: &CommandContext) -> Result<BackupManager> {
    let engine = ctx.engine();
    let config = engine.resolve().await?;
    Ok(engine.backup_manager(&config))
}

/// Run a backup subcommand
pub async fn run_backup(ctx: &CommandContext, action: BackupAction) -> Result<()> {
    let manager = manager(ctx).await?;

    match action {
        BackupAction::Create => {
            let backup = manager.create()?;
            println!(
                "{} Created backup {} ({} file(s))",
                "OK".green().bold(),
                backup.id.cyan(),
                backup.files.len()
            );
        }
        BackupAction::List { json } => {
            let backups = manager.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&backups)?);
            } else if backups.is_empty() {
                println!("No backups found.");
            } else {
                for backup in &backups {
                    println!(
                        "  {}  {}  {} file(s)",
                        backup.id.cyan(),
                        backup.created_at.to_rfc3339().dimmed(),
                        backup.files.len()
                    );
                }
            }
        }
        BackupAction::Restore { id } => {
            let restored = manager.restore(&id)?;
            println!(
                "{} Restored {} file(s) from {} into {}",
                "OK".green().bold(),
                restored.len(),
                id.cyan(),
                manager.managed_dir().as_str().yellow()
            );
        }
        BackupAction::Prune { keep } => {
            let removed = manager.prune(keep)?;
            if removed.is_empty() {
                println!("Nothing to prune.");
            } else {
                for id in &removed {
                    println!("   {} {}", "-".red(), id);
                }
                println!(
                    "{} Removed {} backup(s), kept the newest {}.",
                    "OK".green().bold(),
                    removed.len(),
                    keep
                );
            }
        }
    }

    Ok(())
}
