//! The `settings.json` artifact

use crate::Result;
use crate::capability::CapabilityDescriptor;
use crate::config::{AgentConfig, EffectiveConfiguration, McpServer};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Value of `metadata.generatedBy`.
pub const GENERATOR: &str = "strata";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Settings<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    metadata: Metadata<'a>,
    hooks: BTreeMap<&'a str, Vec<HookEntry<'a>>>,
    mcp_servers: BTreeMap<&'a str, &'a McpServer>,
    #[serde(skip_serializing_if = "no_agents")]
    agents: &'a BTreeMap<String, AgentConfig>,
}

fn no_agents(agents: &&BTreeMap<String, AgentConfig>) -> bool {
    agents.is_empty()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata<'a> {
    profile: &'a str,
    profile_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_description: Option<&'a str>,
    generated_by: &'static str,
}

#[derive(Debug, Serialize)]
struct HookEntry<'a> {
    capability: &'a str,
    matcher: &'a str,
    handler: &'a str,
    priority: i32,
}

/// Render `settings.json` as pretty JSON with a trailing newline.
pub fn render_settings(
    config: &EffectiveConfiguration,
    descriptors: &[CapabilityDescriptor],
) -> Result<String> {
    let settings = Settings {
        model: config.model.default.as_deref(),
        metadata: Metadata {
            profile: &config.profile.name,
            profile_source: config.profile.source.to_string(),
            profile_description: config.profile.description.as_deref(),
            generated_by: GENERATOR,
        },
        hooks: compose_hooks(descriptors),
        mcp_servers: mcp_servers(config, descriptors),
        agents: &config.agents,
    };

    let mut out = serde_json::to_string_pretty(&settings)?;
    out.push('\n');
    Ok(out)
}

/// Hook bindings of enabled capabilities, grouped by event.
///
/// Within an event, higher priority comes first; ties are ordered by
/// capability, matcher and handler so the output is stable.
fn compose_hooks(descriptors: &[CapabilityDescriptor]) -> BTreeMap<&str, Vec<HookEntry<'_>>> {
    let mut hooks: BTreeMap<&str, Vec<HookEntry<'_>>> = BTreeMap::new();
    for descriptor in descriptors.iter().filter(|d| d.enabled) {
        for binding in &descriptor.hook_bindings {
            hooks.entry(binding.event.as_str()).or_default().push(HookEntry {
                capability: &descriptor.name,
                matcher: &binding.matcher,
                handler: &binding.handler_ref,
                priority: binding.priority,
            });
        }
    }
    for entries in hooks.values_mut() {
        entries.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.capability.cmp(b.capability))
                .then_with(|| a.matcher.cmp(b.matcher))
                .then_with(|| a.handler.cmp(b.handler))
        });
    }
    hooks
}

/// Names of the MCP servers that end up in `settings.json`.
///
/// Config-enabled servers plus servers required by enabled capabilities,
/// minus anything disabled. Only servers defined under `mcp.servers` can
/// be emitted.
pub fn selected_mcp_servers<'a>(
    config: &'a EffectiveConfiguration,
    descriptors: &'a [CapabilityDescriptor],
) -> BTreeSet<&'a str> {
    let required = descriptors
        .iter()
        .filter(|d| d.enabled)
        .flat_map(|d| d.required_capabilities.iter())
        .map(String::as_str)
        .filter(|name| config.mcp.servers.contains_key(*name));

    config
        .mcp
        .enabled
        .iter()
        .map(String::as_str)
        .chain(required)
        .filter(|name| !config.mcp.disabled.contains(*name))
        .collect()
}

fn mcp_servers<'a>(
    config: &'a EffectiveConfiguration,
    descriptors: &'a [CapabilityDescriptor],
) -> BTreeMap<&'a str, &'a McpServer> {
    selected_mcp_servers(config, descriptors)
        .into_iter()
        .filter_map(|name| config.mcp.servers.get(name).map(|server| (name, server)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn server(command: &str) -> McpServer {
        McpServer {
            command: command.to_string(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    fn parse(rendered: &str) -> Value {
        serde_json::from_str(rendered).unwrap()
    }

    #[test]
    fn hooks_are_grouped_and_ordered() {
        let descriptors = vec![
            CapabilityDescriptor::new("b").with_hook("PreToolUse", "*", "b.sh", 1),
            CapabilityDescriptor::new("a")
                .with_hook("PreToolUse", "*", "a.sh", 1)
                .with_hook("Stop", "", "stop.sh", 0),
            CapabilityDescriptor::new("c").with_hook("PreToolUse", "*", "c.sh", 9),
            CapabilityDescriptor::new("off")
                .disabled()
                .with_hook("PreToolUse", "*", "off.sh", 99),
        ];
        let rendered = parse(&render_settings(&EffectiveConfiguration::default(), &descriptors).unwrap());

        let capabilities: Vec<&str> = rendered["hooks"]["PreToolUse"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h["capability"].as_str().unwrap())
            .collect();
        assert_eq!(capabilities, vec!["c", "a", "b"]);
        assert_eq!(rendered["hooks"]["Stop"][0]["handler"], "stop.sh");
    }

    #[test]
    fn mcp_servers_union_minus_disabled() {
        let mut config = EffectiveConfiguration::default();
        config.mcp.enabled.insert("files".into());
        config.mcp.disabled.insert("web".into());
        config.mcp.servers.insert("files".into(), server("mcp-files"));
        config.mcp.servers.insert("git".into(), server("mcp-git"));
        config.mcp.servers.insert("web".into(), server("mcp-web"));
        config.mcp.servers.insert("unused".into(), server("mcp-unused"));

        let descriptors = vec![
            CapabilityDescriptor::new("review").requires("git").requires("web"),
            CapabilityDescriptor::new("off").disabled().requires("unused"),
        ];
        let rendered = parse(&render_settings(&config, &descriptors).unwrap());

        let names: Vec<&String> = rendered["mcpServers"].as_object().unwrap().keys().collect();
        assert_eq!(names, vec!["files", "git"]);
        assert_eq!(
            rendered["mcpServers"]["git"],
            json!({"command": "mcp-git", "args": [], "env": {}})
        );
    }

    #[test]
    fn metadata_and_trailing_newline() {
        let mut config = EffectiveConfiguration::default();
        config.profile.description = Some("Work".into());
        config.model.default = Some("opus".into());
        let rendered = render_settings(&config, &[]).unwrap();

        assert!(rendered.ends_with("}\n"));
        let value = parse(&rendered);
        assert_eq!(value["model"], "opus");
        assert_eq!(
            value["metadata"],
            json!({
                "profile": "default",
                "profileSource": "default",
                "profileDescription": "Work",
                "generatedBy": "strata"
            })
        );
        assert!(value.get("agents").is_none());
    }
}
