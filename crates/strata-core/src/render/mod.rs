//! Artifact rendering
//!
//! Pure functions from an effective configuration and capability
//! descriptors to the bytes of each generated file. Nothing here touches the
//! filesystem.

mod settings;

pub use settings::{GENERATOR, render_settings, selected_mcp_servers};

use crate::Result;
use crate::capability::CapabilityDescriptor;
use crate::config::EffectiveConfiguration;
use serde::Serialize;
use strata_blocks::ManagedRegionEditor;

/// File name of the settings artifact inside the managed directory.
pub const SETTINGS_FILE: &str = "settings.json";
/// File name of the instructions artifact inside the managed directory.
pub const INSTRUCTIONS_FILE: &str = "INSTRUCTIONS.md";

/// One generated file, relative to the managed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedArtifact {
    pub relative_path: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    /// Whether the content is a managed block that may share its file
    /// with hand-written text
    pub managed_region: bool,
}

impl RenderedArtifact {
    pub fn new(relative_path: impl Into<String>, content: impl Into<Vec<u8>>, managed_region: bool) -> Self {
        Self {
            relative_path: relative_path.into(),
            content: content.into(),
            managed_region,
        }
    }
}

/// Render the instructions document: `content` wrapped in managed markers.
///
/// Content containing a marker line of its own is refused.
pub fn render_instructions(
    config: &EffectiveConfiguration,
    editor: &ManagedRegionEditor,
) -> Result<String> {
    let body = config.content.as_deref().unwrap_or_default();
    editor.check_content(body)?;
    Ok(editor.wrap(body))
}

/// Render every artifact, in a fixed order.
pub fn render_all(
    config: &EffectiveConfiguration,
    descriptors: &[CapabilityDescriptor],
    editor: &ManagedRegionEditor,
) -> Result<Vec<RenderedArtifact>> {
    Ok(vec![
        RenderedArtifact::new(SETTINGS_FILE, render_settings(config, descriptors)?, false),
        RenderedArtifact::new(INSTRUCTIONS_FILE, render_instructions(config, editor)?, true),
    ])
}
