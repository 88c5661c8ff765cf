//! Capability descriptors supplied by the extension subsystem
//!
//! Descriptors are opaque input: strata reads their enablement, hook
//! bindings and requirements, and never installs or runs anything.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strata_fs::{NormalizedPath, io};

/// One hook binding declared by a capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookBinding {
    pub event: String,
    #[serde(default)]
    pub matcher: String,
    pub handler_ref: String,
    #[serde(default)]
    pub priority: i32,
}

/// An installed extension's declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    pub name: String,
    pub enabled: bool,
    #[serde(default)]
    pub hook_bindings: Vec<HookBinding>,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
}

impl CapabilityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            hook_bindings: Vec::new(),
            required_capabilities: Vec::new(),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_hook(
        mut self,
        event: impl Into<String>,
        matcher: impl Into<String>,
        handler_ref: impl Into<String>,
        priority: i32,
    ) -> Self {
        self.hook_bindings.push(HookBinding {
            event: event.into(),
            matcher: matcher.into(),
            handler_ref: handler_ref.into(),
            priority,
        });
        self
    }

    pub fn requires(mut self, capability: impl Into<String>) -> Self {
        self.required_capabilities.push(capability.into());
        self
    }
}

/// Supplies the current list of capability descriptors.
#[async_trait]
pub trait CapabilitySource: Send + Sync {
    async fn descriptors(&self) -> Result<Vec<CapabilityDescriptor>>;
}

/// A fixed, in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities(pub Vec<CapabilityDescriptor>);

#[async_trait]
impl CapabilitySource for StaticCapabilities {
    async fn descriptors(&self) -> Result<Vec<CapabilityDescriptor>> {
        Ok(self.0.clone())
    }
}

/// A JSON array of descriptors on disk. An absent file is an empty list.
#[derive(Debug, Clone)]
pub struct JsonFileCapabilities {
    path: NormalizedPath,
}

impl JsonFileCapabilities {
    pub fn new(path: NormalizedPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

#[async_trait]
impl CapabilitySource for JsonFileCapabilities {
    async fn descriptors(&self) -> Result<Vec<CapabilityDescriptor>> {
        match io::read_optional_text_async(&self.path).await? {
            Some(content) => {
                let descriptors: Vec<CapabilityDescriptor> = serde_json::from_str(&content)?;
                tracing::debug!(path = %self.path, count = descriptors.len(), "Loaded capability descriptors");
                Ok(descriptors)
            }
            None => {
                tracing::debug!(path = %self.path, "No capability descriptors");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn descriptor_json_is_camel_case() {
        let json = r#"[{
            "name": "lint",
            "enabled": true,
            "hookBindings": [{"event": "PreToolUse", "matcher": "Edit", "handlerRef": "lint.sh", "priority": 5}],
            "requiredCapabilities": ["files"]
        }]"#;
        let parsed: Vec<CapabilityDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed[0],
            CapabilityDescriptor::new("lint")
                .with_hook("PreToolUse", "Edit", "lint.sh", 5)
                .requires("files")
        );
    }

    #[tokio::test]
    async fn absent_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let source = JsonFileCapabilities::new(NormalizedPath::new(temp.path()).join("none.json"));
        assert!(source.descriptors().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("caps.json"), "{not json").unwrap();
        let source = JsonFileCapabilities::new(NormalizedPath::new(temp.path()).join("caps.json"));
        assert!(matches!(
            source.descriptors().await,
            Err(crate::Error::Json(_))
        ));
    }
}
