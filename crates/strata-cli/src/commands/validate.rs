//! Validate command implementation

use colored::Colorize;

use crate::context::CommandContext;
use crate::error::{CliError, Result};

/// Run the validate command
///
/// Prints every finding and fails when there is at least one.
pub async fn run_validate(ctx: &CommandContext, json: bool) -> Result<()> {
    let report = ctx.engine().validate().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.valid {
        println!("{} Configuration is valid.", "OK".green().bold());
    } else {
        println!("{} Found {} problem(s):", "INVALID".red().bold(), report.errors.len());
        for finding in &report.errors {
            println!("   {} {}", "!".red(), finding);
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "Validation failed with {} problem(s)",
            report.errors.len()
        )))
    }
}
