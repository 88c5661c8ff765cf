//! Configuration resolution across all layers
//!
//! The `ConfigResolver` loads the global, profile, project and local layers
//! concurrently, resolves `extends` chains, and merges everything over the
//! built-in defaults one field group at a time.

use super::effective::{
    AgentConfig, CostConfig, DEFAULT_PROFILE, EffectiveConfiguration, McpConfig, McpServer,
    ModelConfig, ProfileInfo, ProfileSource, SkillsConfig, SyncSettings, TeamConfig,
    builtin_defaults,
};
use super::inheritance::{
    CachingLoader, InheritanceNode, LocalReferenceLoader, ReferenceDispatcher, RemoteFetcher,
    RemoteReferenceLoader, resolve_inheritance,
};
use super::merge::{ToggleSet, deep_merge};
use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use strata_fs::{NormalizedPath, StrataPath, io, validate_path_identifier};
use strata_meta::{ConfigLayer, LayerKind, Tree, read_layer, validate_layer};

/// Environment variable overriding the global configuration directory.
pub const STRATA_HOME_ENV: &str = "STRATA_HOME";

/// The platform global directory: `$STRATA_HOME`, else `<config_dir>/strata`.
///
/// - Linux: `~/.config/strata/`
/// - macOS: `~/Library/Application Support/strata/`
/// - Windows: `%APPDATA%\strata\`
pub fn default_global_dir() -> Option<NormalizedPath> {
    if let Some(home) = std::env::var_os(STRATA_HOME_ENV).filter(|v| !v.is_empty()) {
        return Some(NormalizedPath::new(home));
    }
    dirs::config_dir().map(|dir| NormalizedPath::new(dir.join("strata")))
}

/// Where one layer came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerProvenance {
    pub kind: LayerKind,
    /// File the layer lives in; `None` for built-in defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Whether the file existed
    pub present: bool,
    /// `extends` references followed, nearest parent first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
}

/// The effective configuration plus a record of every contributing layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfiguration {
    pub config: EffectiveConfiguration,
    pub layers: Vec<LayerProvenance>,
}

/// A layer after loading, validation and inheritance.
#[derive(Debug, Clone)]
struct LoadedLayer {
    layer: ConfigLayer,
    /// `extends` references followed to build `layer`
    chain: Vec<String>,
}

impl LoadedLayer {
    fn defaults() -> Self {
        Self::plain(ConfigLayer::new(LayerKind::Default, builtin_defaults(), None))
    }

    fn plain(layer: ConfigLayer) -> Self {
        Self {
            layer,
            chain: Vec::new(),
        }
    }

    fn provenance(&self) -> LayerProvenance {
        LayerProvenance {
            kind: self.layer.kind,
            path: self.layer.source.as_ref().map(|p| p.as_str().to_string()),
            present: self.layer.present,
            chain: self.chain.clone(),
        }
    }
}

/// Resolves the effective configuration for a project.
///
/// Layers, lowest precedence first:
/// 1. Built-in defaults
/// 2. Global (`<global>/config.toml`)
/// 3. Profile (`<global>/profiles/<name>.toml`)
/// 4. Project (`<project>/.strata/config.toml`)
/// 5. Local (`<project>/.strata/config.local.toml`), git-ignored
///
/// Missing files are empty layers. Malformed or invalid files abort
/// resolution with the file and field at fault.
#[derive(Clone)]
pub struct ConfigResolver {
    project_root: NormalizedPath,
    global_dir: NormalizedPath,
    fetcher: Option<Arc<dyn RemoteFetcher>>,
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("project_root", &self.project_root)
            .field("global_dir", &self.global_dir)
            .field("remote", &self.fetcher.is_some())
            .finish()
    }
}

impl ConfigResolver {
    /// Create a resolver for `project_root` using `global_dir` for global
    /// configuration, profiles and the active-profile pointer.
    pub fn new(project_root: NormalizedPath, global_dir: NormalizedPath) -> Self {
        Self {
            project_root: project_root.clean(),
            global_dir: global_dir.clean(),
            fetcher: None,
        }
    }

    /// Allow remote `extends` references, fetched with `fetcher`.
    pub fn with_remote_fetcher(mut self, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn project_root(&self) -> &NormalizedPath {
        &self.project_root
    }

    pub fn global_dir(&self) -> &NormalizedPath {
        &self.global_dir
    }

    pub fn profiles_dir(&self) -> NormalizedPath {
        self.global_dir.join(StrataPath::ProfilesDir.as_str())
    }

    pub fn profile_path(&self, name: &str) -> NormalizedPath {
        self.profiles_dir().join(&format!("{name}.toml"))
    }

    /// Resolve the effective configuration.
    ///
    /// `profile_override` beats both the pointer file and the project
    /// layer's `profile` key. `project_root_override` replaces the root the
    /// resolver was built with.
    pub async fn resolve(
        &self,
        profile_override: Option<&str>,
        project_root_override: Option<&NormalizedPath>,
    ) -> Result<EffectiveConfiguration> {
        Ok(self
            .resolve_with_provenance(profile_override, project_root_override)
            .await?
            .config)
    }

    /// Resolve and report where each layer came from.
    pub async fn resolve_with_provenance(
        &self,
        profile_override: Option<&str>,
        project_root_override: Option<&NormalizedPath>,
    ) -> Result<ResolvedConfiguration> {
        let root = project_root_override.map_or_else(|| self.project_root.clone(), NormalizedPath::clean);
        let strata_dir = root.join(StrataPath::ProjectDir.as_str());
        let loader = CachingLoader::new(ReferenceDispatcher::new(
            LocalReferenceLoader::new(self.profiles_dir()),
            match &self.fetcher {
                Some(fetcher) => RemoteReferenceLoader::new(fetcher.clone()),
                None => RemoteReferenceLoader::offline(),
            },
        ));

        let (mut profile_name, mut profile_source) = match profile_override {
            Some(name) => (name.to_string(), ProfileSource::Explicit),
            None => self.read_active_profile().await?,
        };

        let (global, profile, project, local) = tokio::join!(
            self.load_plain(
                LayerKind::Global,
                self.global_dir.join(StrataPath::GlobalConfig.as_str())
            ),
            self.load_profile(&profile_name, &loader),
            self.load_extending(
                LayerKind::Project,
                strata_dir.join(StrataPath::ProjectConfig.as_str()),
                &loader
            ),
            self.load_plain(
                LayerKind::Local,
                strata_dir.join(StrataPath::LocalConfig.as_str())
            ),
        );
        let (global, mut profile, project, local) = (global?, profile?, project?, local?);

        // The project may select its own profile, one level deep
        if profile_override.is_none()
            && let Some(Value::String(name)) = project.layer.section("profile")
        {
            if *name != profile_name {
                tracing::debug!(profile = %name, "Project layer selects profile");
                profile = self.load_profile(name, &loader).await?;
                profile_name = name.clone();
            }
            profile_source = ProfileSource::Project;
        }

        let description = profile
            .layer
            .section("profile")
            .and_then(|meta| meta.get("description"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let loaded = vec![LoadedLayer::defaults(), global, profile, project, local];
        let provenance = loaded.iter().map(LoadedLayer::provenance).collect();
        let layers: Vec<ConfigLayer> = loaded.into_iter().map(|l| l.layer).collect();
        let mut config = merge_groups(&layers)?;
        config.profile = ProfileInfo {
            name: profile_name,
            description,
            source: profile_source,
        };

        tracing::debug!(
            profile = %config.profile.name,
            source = %config.profile.source,
            "Configuration resolved"
        );

        Ok(ResolvedConfiguration {
            config,
            layers: provenance,
        })
    }

    /// Profile name from the pointer file, else the fixed default.
    async fn read_active_profile(&self) -> Result<(String, ProfileSource)> {
        let pointer = self.global_dir.join(StrataPath::ActiveProfile.as_str());
        let selected = io::read_optional_text_async(&pointer)
            .await?
            .and_then(|content| {
                content
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .map(str::to_string)
            });

        Ok(match selected {
            Some(name) => (name, ProfileSource::Global),
            None => (DEFAULT_PROFILE.to_string(), ProfileSource::Default),
        })
    }

    /// Load a layer that cannot extend anything.
    async fn load_plain(&self, kind: LayerKind, path: NormalizedPath) -> Result<LoadedLayer> {
        Ok(LoadedLayer::plain(match read_validated(kind, &path).await? {
            Some(tree) => ConfigLayer::new(kind, tree, Some(path)),
            None => ConfigLayer::absent(kind, path),
        }))
    }

    /// Load a layer and resolve its `extends` chain.
    async fn load_extending(
        &self,
        kind: LayerKind,
        path: NormalizedPath,
        loader: &CachingLoader<ReferenceDispatcher>,
    ) -> Result<LoadedLayer> {
        let Some(tree) = read_validated(kind, &path).await? else {
            tracing::debug!(%kind, %path, "Layer absent; using empty tree");
            return Ok(LoadedLayer::plain(ConfigLayer::absent(kind, path)));
        };

        let node = InheritanceNode::from_file(kind, tree, &path);
        let inherited = resolve_inheritance(node, loader).await?;
        Ok(LoadedLayer {
            layer: ConfigLayer::new(kind, inherited.tree, Some(path)),
            chain: inherited.chain,
        })
    }

    /// Load a profile by name. A missing profile is an empty layer.
    async fn load_profile(
        &self,
        name: &str,
        loader: &CachingLoader<ReferenceDispatcher>,
    ) -> Result<LoadedLayer> {
        validate_path_identifier(name, "Profile name").map_err(|reason| {
            Error::InvalidReference {
                reference: name.to_string(),
                reason,
            }
        })?;
        self.load_extending(LayerKind::Profile, self.profile_path(name), loader)
            .await
    }
}

async fn read_validated(kind: LayerKind, path: &NormalizedPath) -> Result<Option<Tree>> {
    match read_layer(path).await? {
        Some(tree) => Ok(Some(validate_layer(kind, tree, path)?)),
        None => Ok(None),
    }
}

/// Deep-merge one group across all layers, in precedence order.
fn resolve_group(layers: &[ConfigLayer], key: &str) -> Option<Value> {
    let mut merged: Option<Value> = None;
    for layer in layers {
        let Some(value) = layer.section(key).filter(|v| !v.is_null()) else {
            continue;
        };
        merged = Some(match (merged.take(), value) {
            (Some(Value::Object(mut acc)), Value::Object(incoming)) => {
                deep_merge(&mut acc, incoming);
                Value::Object(acc)
            }
            _ => value.clone(),
        });
    }
    merged
}

fn typed_group<T: DeserializeOwned + Default>(layers: &[ConfigLayer], key: &str) -> Result<T> {
    match resolve_group(layers, key) {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(T::default()),
    }
}

fn toggle_group(layers: &[ConfigLayer], key: &str) -> ToggleSet {
    let mut set = ToggleSet::default();
    for layer in layers {
        set.apply_group(layer.section(key));
    }
    set
}

fn string_group(layers: &[ConfigLayer], key: &str) -> Option<String> {
    resolve_group(layers, key).and_then(|v| v.as_str().map(str::to_string))
}

/// Build the effective configuration, one group at a time.
fn merge_groups(layers: &[ConfigLayer]) -> Result<EffectiveConfiguration> {
    let skills = toggle_group(layers, "skills");
    let mcp_toggles = toggle_group(layers, "mcp");
    let servers: BTreeMap<String, McpServer> = resolve_group(layers, "mcp")
        .and_then(|mcp| mcp.get("servers").cloned())
        .map(serde_json::from_value)
        .transpose()?
        .unwrap_or_default();

    Ok(EffectiveConfiguration {
        profile: ProfileInfo::default(),
        model: typed_group::<ModelConfig>(layers, "model")?,
        cost: typed_group::<CostConfig>(layers, "cost")?,
        sync: typed_group::<SyncSettings>(layers, "sync")?,
        team: typed_group::<TeamConfig>(layers, "team")?,
        skills: SkillsConfig {
            enabled: skills.enabled,
            disabled: skills.disabled,
        },
        agents: typed_group::<BTreeMap<String, AgentConfig>>(layers, "agents")?,
        mcp: McpConfig {
            enabled: mcp_toggles.enabled,
            disabled: mcp_toggles.disabled,
            servers,
        },
        package_manager: string_group(layers, "package_manager"),
        content: string_group(layers, "content"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layer(kind: LayerKind, value: Value) -> ConfigLayer {
        ConfigLayer::new(kind, value.as_object().cloned().unwrap(), None)
    }

    #[test]
    fn group_merge_walks_layers_in_order() {
        let layers = vec![
            LoadedLayer::defaults().layer,
            layer(LayerKind::Global, json!({"sync": {"backup": false}})),
            layer(LayerKind::Project, json!({"sync": {"target_dir": "out"}})),
        ];
        let sync: SyncSettings = typed_group(&layers, "sync").unwrap();
        assert_eq!(sync.target_dir, "out");
        assert!(!sync.backup);
        assert!(sync.preserve_user_content);
    }

    #[test]
    fn toggles_merge_across_layers() {
        let layers = vec![
            layer(LayerKind::Global, json!({"mcp": {"enabled": ["a", "b"]}})),
            layer(LayerKind::Local, json!({"mcp": {"disabled": ["b"]}})),
        ];
        let config = merge_groups(&layers).unwrap();
        assert!(config.mcp.is_enabled("a"));
        assert!(!config.mcp.is_enabled("b"));
        assert!(config.mcp.disabled.contains("b"));
    }

    #[test]
    fn defaults_alone_resolve() {
        let config = merge_groups(&[LoadedLayer::defaults().layer]).unwrap();
        assert_eq!(config.model.default.as_deref(), Some("sonnet"));
        assert_eq!(config.sync, SyncSettings::default());
        assert_eq!(config.cost, CostConfig::default());
    }
}
