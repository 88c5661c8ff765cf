//! Layer and descriptor snippets reused across test suites.

/// Project layer for the canonical scenario: a model and a notes body.
pub const SCENARIO_PROJECT: &str = "content = \"# Notes\"\n\n[model]\ndefault = \"sonnet\"\n";

/// A global layer touching most groups.
pub const GLOBAL_LAYER: &str = r#"
package_manager = "npm"

[model]
default = "haiku"

[cost]
daily_budget = 10

[sync]
backup_retention = 5

[skills]
enabled = ["git", "web"]

[agents.reviewer]
model = "haiku"
priority = 1

[mcp.servers.files]
command = "mcp-files"
args = ["--root", "."]
"#;

/// Two capabilities: one hooking edits and requiring the `files` server,
/// and a disabled one whose hooks must never render.
pub const CAPABILITIES_JSON: &str = r#"[
  {
    "name": "lint",
    "enabled": true,
    "hookBindings": [
      {"event": "PostToolUse", "matcher": "Edit", "handlerRef": "lint.sh", "priority": 10}
    ],
    "requiredCapabilities": ["files"]
  },
  {
    "name": "telemetry",
    "enabled": false,
    "hookBindings": [
      {"event": "Stop", "matcher": "", "handlerRef": "report.sh", "priority": 0}
    ]
  }
]
"#;

/// A profile layer named `name` that extends `parent`.
pub fn extending_profile(name: &str, parent: &str) -> String {
    format!("extends = \"{parent}\"\n\n[profile]\nname = \"{name}\"\n")
}
