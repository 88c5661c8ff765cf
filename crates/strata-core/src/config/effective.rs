//! The effective configuration produced by resolution

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use strata_meta::Tree;

/// Model used when no layer names one.
pub const DEFAULT_MODEL: &str = "sonnet";
/// Managed directory, relative to the project root.
pub const DEFAULT_TARGET_DIR: &str = ".agent";
/// Snapshots kept after each sync.
pub const DEFAULT_BACKUP_RETENTION: usize = 10;
/// Fraction of a budget at which cost warnings start.
pub const DEFAULT_WARN_THRESHOLD: f64 = 0.8;
/// Profile used when nothing selects one.
pub const DEFAULT_PROFILE: &str = "default";

/// The built-in defaults layer, lowest in precedence.
pub fn builtin_defaults() -> Tree {
    let defaults = json!({
        "model": { "default": DEFAULT_MODEL },
        "cost": { "warn_threshold": DEFAULT_WARN_THRESHOLD },
        "sync": {
            "target_dir": DEFAULT_TARGET_DIR,
            "backup": true,
            "preserve_user_content": true,
            "backup_retention": DEFAULT_BACKUP_RETENTION,
        },
    });
    match defaults {
        serde_json::Value::Object(map) => map,
        _ => Tree::new(),
    }
}

/// Which source selected the active profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    /// Nothing selected a profile; the fixed default name is used
    #[default]
    Default,
    /// The global active-profile pointer file
    Global,
    /// The project layer's `profile` key
    Project,
    /// The caller named the profile explicitly
    Explicit,
}

impl std::fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Default => "default",
            Self::Global => "global",
            Self::Project => "project",
            Self::Explicit => "explicit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ProfileInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: ProfileSource,
}

impl Default for ProfileInfo {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROFILE.to_string(),
            description: None,
            source: ProfileSource::Default,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct ModelConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct CostConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<f64>,
    pub warn_threshold: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            daily_budget: None,
            monthly_budget: None,
            warn_threshold: DEFAULT_WARN_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct SyncSettings {
    pub target_dir: String,
    pub backup: bool,
    pub preserve_user_content: bool,
    pub backup_retention: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            target_dir: DEFAULT_TARGET_DIR.to_string(),
            backup: true,
            preserve_user_content: true,
            backup_retention: DEFAULT_BACKUP_RETENTION,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServer {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    pub enabled: BTreeSet<String>,
    pub disabled: BTreeSet<String>,
    pub servers: BTreeMap<String, McpServer>,
}

impl McpConfig {
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains(name) && !self.disabled.contains(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    pub enabled: BTreeSet<String>,
    pub disabled: BTreeSet<String>,
}

/// The single merged result of every configuration layer.
///
/// Immutable once produced; rendering and sync only read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct EffectiveConfiguration {
    pub profile: ProfileInfo,
    pub model: ModelConfig,
    pub cost: CostConfig,
    pub sync: SyncSettings,
    pub team: TeamConfig,
    pub skills: SkillsConfig,
    pub agents: BTreeMap<String, AgentConfig>,
    pub mcp: McpConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl EffectiveConfiguration {
    /// Render as pretty JSON with camelCase keys.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as TOML with camelCase keys.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_defaults_match_struct_defaults() {
        let tree = builtin_defaults();
        let sync: SyncSettings =
            serde_json::from_value(tree["sync"].clone()).expect("sync defaults deserialize");
        assert_eq!(sync, SyncSettings::default());
        assert_eq!(tree["model"]["default"], DEFAULT_MODEL);
    }

    #[test]
    fn json_output_uses_camel_case() {
        let config = EffectiveConfiguration {
            package_manager: Some("pnpm".into()),
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"packageManager\": \"pnpm\""));
        assert!(json.contains("\"targetDir\": \".agent\""));
        assert!(json.contains("\"preserveUserContent\": true"));
        assert!(!json.contains("\"content\""));
    }

    #[test]
    fn toml_output_renders() {
        let toml = EffectiveConfiguration::default().to_toml().unwrap();
        assert!(toml.contains("backupRetention = 10"));
    }
}
