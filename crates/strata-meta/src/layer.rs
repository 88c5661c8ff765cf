//! Layer kinds and validated layers

use serde::{Deserialize, Serialize};
use strata_fs::NormalizedPath;

/// A raw key/value tree as read from a layer file.
pub type Tree = serde_json::Map<String, serde_json::Value>;

/// The precedence position of a configuration source.
///
/// The derived ordering is the merge order: later kinds win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Built-in defaults compiled into Strata
    Default,
    /// `<global>/config.toml`
    Global,
    /// `<global>/profiles/<name>.toml`
    Profile,
    /// `<project>/.strata/config.toml`
    Project,
    /// `<project>/.strata/config.local.toml`
    Local,
}

impl LayerKind {
    /// All kinds in precedence order, lowest first.
    pub const ALL: [LayerKind; 5] = [
        LayerKind::Default,
        LayerKind::Global,
        LayerKind::Profile,
        LayerKind::Project,
        LayerKind::Local,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Global => "global",
            Self::Profile => "profile",
            Self::Project => "project",
            Self::Local => "local",
        }
    }

    /// Whether layers of this kind may carry an `extends` reference.
    pub fn supports_extends(&self) -> bool {
        matches!(self, Self::Profile | Self::Project)
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated configuration source.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayer {
    pub kind: LayerKind,
    pub tree: Tree,
    /// File the layer lives in; `None` for built-ins.
    pub source: Option<NormalizedPath>,
    /// Whether the source existed. An absent file is an empty layer.
    pub present: bool,
}

impl ConfigLayer {
    pub fn new(kind: LayerKind, tree: Tree, source: Option<NormalizedPath>) -> Self {
        Self {
            kind,
            tree,
            source,
            present: true,
        }
    }

    /// The empty layer standing in for a missing file.
    pub fn absent(kind: LayerKind, source: NormalizedPath) -> Self {
        Self {
            kind,
            tree: Tree::new(),
            source: Some(source),
            present: false,
        }
    }

    /// The top-level section named `key`, if present.
    pub fn section(&self, key: &str) -> Option<&serde_json::Value> {
        self.tree.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_ordered_by_precedence() {
        let mut kinds = LayerKind::ALL.to_vec();
        kinds.reverse();
        kinds.sort();
        assert_eq!(kinds, LayerKind::ALL.to_vec());
        assert!(LayerKind::Local > LayerKind::Project);
        assert!(LayerKind::Global > LayerKind::Default);
    }

    #[test]
    fn absent_layer_is_empty_but_keeps_its_path() {
        let layer = ConfigLayer::absent(LayerKind::Local, NormalizedPath::new("/p/.strata/config.local.toml"));
        assert!(!layer.present);
        assert!(layer.tree.is_empty());
        assert!(layer.section("model").is_none());
        assert_eq!(layer.source.unwrap().file_name(), Some("config.local.toml"));
    }

    #[test]
    fn only_profile_and_project_extend() {
        assert!(LayerKind::Profile.supports_extends());
        assert!(LayerKind::Project.supports_extends());
        assert!(!LayerKind::Global.supports_extends());
        assert!(!LayerKind::Local.supports_extends());
    }
}
