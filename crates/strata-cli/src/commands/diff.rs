//! Diff command implementation
//!
//! Previews what changes sync would make without applying them.

use colored::Colorize;
use serde_json::json;

use strata_core::{DiffEntry, DiffKind};

use crate::context::CommandContext;
use crate::error::Result;

/// Run the diff command
pub async fn run_diff(ctx: &CommandContext, json: bool) -> Result<()> {
    let entries = ctx.engine().diff().await?;
    let has_changes = entries.iter().any(DiffEntry::is_change);

    if json {
        let output = json!({
            "hasChanges": has_changes,
            "changes": entries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_diff_output(&entries, has_changes, ctx);
    }

    Ok(())
}

/// Print human-readable diff-style output
fn print_diff_output(entries: &[DiffEntry], has_changes: bool, ctx: &CommandContext) {
    if !has_changes {
        println!(
            "{} No changes needed. Managed directory is in sync.",
            "OK".green().bold()
        );
        return;
    }

    println!(
        "{} {}",
        "Diff".blue().bold(),
        ctx.project_root.as_str().yellow()
    );
    println!();

    for entry in entries {
        let (prefix, file) = match entry.kind {
            DiffKind::Create => ("+".green(), entry.file.green()),
            DiffKind::Modify => ("~".yellow(), entry.file.yellow()),
            DiffKind::Unchanged => (" ".normal(), entry.file.dimmed()),
        };
        match &entry.summary {
            Some(summary) => println!("  {} {} ({})", prefix, file, summary.dimmed()),
            None => println!("  {} {}", prefix, file),
        }
    }

    println!();
    println!("Run {} to apply these changes.", "strata sync".cyan());
}
