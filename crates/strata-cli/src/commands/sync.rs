//! Sync command implementation
//!
//! Writes changed artifacts into the managed directory.

use colored::Colorize;

use strata_core::{SyncOptions, SyncResult};

use crate::context::CommandContext;
use crate::error::{CliError, Result};

/// Map `--backup` / `--no-backup` to an override; `None` defers to config.
pub fn backup_override(backup: bool, no_backup: bool) -> Option<bool> {
    match (backup, no_backup) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Run the sync command
///
/// Fails with a user error when the engine reports `success: false`, after
/// printing the result so the warnings are visible.
pub async fn run_sync(ctx: &CommandContext, options: SyncOptions, json: bool) -> Result<()> {
    let engine = ctx.engine();

    if !json {
        let verb = if options.dry_run { "Checking" } else { "Syncing" };
        println!(
            "{} {} {}",
            "=>".blue().bold(),
            verb,
            ctx.project_root.as_str().yellow()
        );
    }

    let result = engine.sync(options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    if result.success {
        Ok(())
    } else {
        Err(CliError::user("Sync did not complete; no files were written"))
    }
}

fn print_result(result: &SyncResult) {
    for warning in &result.warnings {
        println!("   {} {}", "!".yellow(), warning);
    }
    if !result.success {
        return;
    }

    if let Some(path) = &result.backup_path {
        println!("   {} Backup saved to {}", "*".blue(), path.dimmed());
    }

    if result.modified_files.is_empty() {
        println!("{} Already in sync.", "OK".green().bold());
        return;
    }

    for file in &result.modified_files {
        println!("   {} {}", "~".yellow(), file.cyan());
    }

    if result.dry_run {
        println!();
        println!(
            "{} {} file(s) would be written. Run {} to apply.",
            "DRY-RUN".yellow().bold(),
            result.modified_files.len(),
            "strata sync".cyan()
        );
    } else {
        println!(
            "{} Wrote {} file(s).",
            "OK".green().bold(),
            result.modified_files.len()
        );
    }
}
