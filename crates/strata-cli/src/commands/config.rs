//! Config command implementation
//!
//! Prints the effective configuration, optionally with the layers that
//! produced it.

use strata_core::{LayerProvenance, ResolvedConfiguration};

use crate::context::CommandContext;
use crate::error::Result;

/// Run the config command
pub async fn run_config(ctx: &CommandContext, json: bool, layers: bool) -> Result<()> {
    let resolved = ctx
        .resolver()
        .resolve_with_provenance(ctx.profile.as_deref(), None)
        .await?;

    print!("{}", format_config(&resolved, json, layers)?);
    Ok(())
}

/// Render the configuration as JSON or TOML.
///
/// With `layers`, JSON output nests the configuration next to a `layers`
/// array; TOML output gets a comment header listing each layer.
pub fn format_config(resolved: &ResolvedConfiguration, json: bool, layers: bool) -> Result<String> {
    let mut out = String::new();
    if json {
        let body = if layers {
            serde_json::to_string_pretty(resolved)?
        } else {
            resolved.config.to_json()?
        };
        out.push_str(&body);
        out.push('\n');
    } else {
        if layers {
            for layer in &resolved.layers {
                out.push_str(&layer_comment(layer));
                out.push('\n');
            }
            out.push('\n');
        }
        out.push_str(&resolved.config.to_toml()?);
    }
    Ok(out)
}

fn layer_comment(layer: &LayerProvenance) -> String {
    let source = match (&layer.path, layer.present) {
        (None, _) => "(built-in)".to_string(),
        (Some(path), true) => path.clone(),
        (Some(path), false) => format!("{path} (missing)"),
    };
    let mut line = format!("# {:<8} {}", layer.kind.as_str(), source);
    if !layer.chain.is_empty() {
        line.push_str(&format!(" extends {}", layer.chain.join(" -> ")));
    }
    line
}
