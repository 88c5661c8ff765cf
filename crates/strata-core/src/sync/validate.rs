//! Structural checks that never block a sync

use crate::capability::CapabilityDescriptor;
use crate::config::EffectiveConfiguration;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A problem found by validation. Collected, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationFinding {
    /// An enabled capability requires something that is not supplied
    #[serde(rename_all = "camelCase")]
    MissingCapability { capability: String, required_by: String },
    /// An enabled capability requires a capability that is disabled
    #[serde(rename_all = "camelCase")]
    DisabledCapability { capability: String, required_by: String },
    /// Two descriptors share a name
    DuplicateCapability { name: String },
    /// A hook binding cannot be rendered meaningfully
    InvalidHookBinding {
        capability: String,
        index: usize,
        reason: String,
    },
    /// The configuration itself is unusable or inconsistent
    Configuration { message: String },
}

impl std::fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCapability {
                capability,
                required_by,
            } => write!(
                f,
                "Capability `{required_by}` requires `{capability}`, which is not available"
            ),
            Self::DisabledCapability {
                capability,
                required_by,
            } => write!(
                f,
                "Capability `{required_by}` requires `{capability}`, which is disabled"
            ),
            Self::DuplicateCapability { name } => {
                write!(f, "Capability `{name}` is declared more than once")
            }
            Self::InvalidHookBinding {
                capability,
                index,
                reason,
            } => write!(f, "Hook binding {index} of `{capability}` is invalid: {reason}"),
            Self::Configuration { message } => write!(f, "Configuration: {message}"),
        }
    }
}

/// The outcome of [`validate`](crate::SyncEngine::validate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationFinding>,
}

impl ValidationReport {
    pub fn from_findings(errors: Vec<ValidationFinding>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check descriptors and configuration against each other.
///
/// A required capability is satisfied by an enabled descriptor of that name
/// or by an MCP server defined in the configuration.
pub fn check(
    config: &EffectiveConfiguration,
    descriptors: &[CapabilityDescriptor],
) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();

    let mut by_name: BTreeMap<&str, &CapabilityDescriptor> = BTreeMap::new();
    let mut duplicates = BTreeSet::new();
    for descriptor in descriptors {
        if by_name.insert(descriptor.name.as_str(), descriptor).is_some() {
            duplicates.insert(descriptor.name.as_str());
        }
    }
    findings.extend(
        duplicates
            .into_iter()
            .map(|name| ValidationFinding::DuplicateCapability {
                name: name.to_string(),
            }),
    );

    for descriptor in descriptors.iter().filter(|d| d.enabled) {
        for required in &descriptor.required_capabilities {
            let finding = match by_name.get(required.as_str()) {
                Some(found) if found.enabled => None,
                Some(_) => Some(ValidationFinding::DisabledCapability {
                    capability: required.clone(),
                    required_by: descriptor.name.clone(),
                }),
                None if config.mcp.servers.contains_key(required) => None,
                None => Some(ValidationFinding::MissingCapability {
                    capability: required.clone(),
                    required_by: descriptor.name.clone(),
                }),
            };
            findings.extend(finding);
        }

        for (index, binding) in descriptor.hook_bindings.iter().enumerate() {
            let reason = if binding.event.trim().is_empty() {
                Some("event is empty")
            } else if binding.handler_ref.trim().is_empty() {
                Some("handler is empty")
            } else {
                None
            };
            if let Some(reason) = reason {
                findings.push(ValidationFinding::InvalidHookBinding {
                    capability: descriptor.name.clone(),
                    index,
                    reason: reason.to_string(),
                });
            }
        }
    }

    for name in &config.mcp.enabled {
        if !config.mcp.servers.contains_key(name) {
            findings.push(ValidationFinding::Configuration {
                message: format!("MCP server `{name}` is enabled but not defined under mcp.servers"),
            });
        }
    }

    findings
}
