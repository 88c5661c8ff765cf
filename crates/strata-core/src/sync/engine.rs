//! SyncEngine implementation
//!
//! The SyncEngine turns the effective configuration and the current
//! capability descriptors into files in the managed directory.

use std::sync::Arc;

use serde::Serialize;
use strata_blocks::ManagedRegionEditor;
use strata_fs::{NormalizedPath, StrataPath, io};

use crate::backup::BackupManager;
use crate::capability::{CapabilityDescriptor, CapabilitySource};
use crate::config::{ConfigResolver, EffectiveConfiguration};
use crate::render::render_all;
use crate::{Error, Result};

use super::diff::{DiffEntry, diff_artifact};
use super::validate::{ValidationFinding, ValidationReport, check};

/// Options for a sync run
///
/// `backup` and `preserve_user_content` fall back to the configuration's
/// `sync` group when `None`.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Snapshot the managed directory before writing
    pub backup: Option<bool>,
    /// Write even if the snapshot fails
    pub force: bool,
    /// Keep hand-written text around managed regions
    pub preserve_user_content: Option<bool>,
    /// Report what would change without writing anything
    pub dry_run: bool,
}

/// Result of a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// Whether the run completed
    pub success: bool,
    /// Files written, or that would be written in a dry run
    pub modified_files: Vec<String>,
    /// Recoverable problems encountered along the way
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    pub dry_run: bool,
}

/// One artifact ready to be compared and written.
#[derive(Debug, Clone)]
struct PlannedFile {
    target: NormalizedPath,
    content: Vec<u8>,
    entry: DiffEntry,
}

/// Everything a run needs, computed before anything is written.
struct Plan {
    config: EffectiveConfiguration,
    descriptors: Vec<CapabilityDescriptor>,
    files: Vec<PlannedFile>,
}

/// Engine for synchronizing generated artifacts
///
/// The SyncEngine provides three operations:
/// - **sync**: write every artifact whose bytes differ from disk
/// - **diff**: classify each artifact as create, modify or unchanged
/// - **validate**: report structural problems without writing
pub struct SyncEngine {
    resolver: ConfigResolver,
    capabilities: Arc<dyn CapabilitySource>,
    profile: Option<String>,
    editor: ManagedRegionEditor,
}

impl SyncEngine {
    /// Create an engine resolving configuration with `resolver` and reading
    /// descriptors from `capabilities`.
    pub fn new(resolver: ConfigResolver, capabilities: Arc<dyn CapabilitySource>) -> Self {
        Self {
            resolver,
            capabilities,
            profile: None,
            editor: ManagedRegionEditor::default(),
        }
    }

    /// Resolve with an explicit profile instead of the selected one.
    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    pub fn project_root(&self) -> &NormalizedPath {
        self.resolver.project_root()
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Resolve the effective configuration the engine would use.
    pub async fn resolve(&self) -> Result<EffectiveConfiguration> {
        self.resolver.resolve(self.profile.as_deref(), None).await
    }

    /// The managed directory for `config`.
    pub fn managed_dir(&self, config: &EffectiveConfiguration) -> NormalizedPath {
        let target = &config.sync.target_dir;
        if std::path::Path::new(target).is_absolute() {
            NormalizedPath::new(target).clean()
        } else {
            self.project_root().join(target).clean()
        }
    }

    /// `<project>/.strata/backups`
    pub fn backups_dir(&self) -> NormalizedPath {
        self.project_root()
            .join(StrataPath::ProjectDir.as_str())
            .join(StrataPath::BackupsDir.as_str())
            .clean()
    }

    /// The snapshot manager for `config`'s managed directory.
    pub fn backup_manager(&self, config: &EffectiveConfiguration) -> BackupManager {
        BackupManager::new(self.backups_dir(), self.managed_dir(config))
    }

    /// The managed directory, refused when it overlaps the backups directory.
    fn checked_managed_dir(&self, config: &EffectiveConfiguration) -> Result<NormalizedPath> {
        let manager = self.backup_manager(config);
        if manager.overlaps_backups() {
            return Err(Error::InvalidTargetDir {
                target: config.sync.target_dir.clone(),
                reason: format!(
                    "{} overlaps the backup directory {}",
                    manager.managed_dir(),
                    manager.backups_dir()
                ),
            });
        }
        Ok(manager.managed_dir().clone())
    }

    /// Path shown to users: relative to the project root when possible.
    fn display_path(&self, path: &NormalizedPath) -> String {
        path.relative_to(self.project_root())
            .unwrap_or_else(|| path.clone())
            .as_str()
            .to_string()
    }

    async fn plan(&self, preserve: Option<bool>) -> Result<Plan> {
        let config = self.resolve().await?;
        let descriptors = self.capabilities.descriptors().await?;
        let preserve = preserve.unwrap_or(config.sync.preserve_user_content);
        let managed_dir = self.checked_managed_dir(&config)?;

        let mut files = Vec::new();
        for artifact in render_all(&config, &descriptors, &self.editor)? {
            let target = managed_dir.join(&artifact.relative_path);
            let current = io::read_optional_bytes(&target).map_err(|source| Error::SyncIo {
                path: target.to_native(),
                source,
            })?;

            let content = match (&current, artifact.managed_region && preserve) {
                (Some(existing), true) => self.editor.apply_bytes(Some(existing), &artifact.content),
                _ => artifact.content,
            };

            let entry = diff_artifact(self.display_path(&target), &content, current.as_deref());
            files.push(PlannedFile {
                target,
                content,
                entry,
            });
        }

        Ok(Plan {
            config,
            descriptors,
            files,
        })
    }

    /// Compare every artifact with disk.
    pub async fn diff(&self) -> Result<Vec<DiffEntry>> {
        let plan = self.plan(None).await?;
        Ok(plan.files.into_iter().map(|f| f.entry).collect())
    }

    /// Collect every structural problem. Never fails.
    pub async fn validate(&self) -> ValidationReport {
        let config = match self.resolve().await {
            Ok(config) => config,
            Err(e) => {
                return ValidationReport::from_findings(vec![ValidationFinding::Configuration {
                    message: e.to_string(),
                }]);
            }
        };

        let mut findings = Vec::new();
        if let Err(e) = self.checked_managed_dir(&config) {
            findings.push(ValidationFinding::Configuration {
                message: e.to_string(),
            });
        }
        if let Some(content) = &config.content
            && let Err(e) = self.editor.check_content(content)
        {
            findings.push(ValidationFinding::Configuration {
                message: format!("content: {e}"),
            });
        }

        match self.capabilities.descriptors().await {
            Ok(descriptors) => findings.extend(check(&config, &descriptors)),
            Err(e) => findings.push(ValidationFinding::Configuration {
                message: format!("Failed to read capability descriptors: {e}"),
            }),
        }
        ValidationReport::from_findings(findings)
    }

    /// Write every changed artifact.
    ///
    /// Unchanged files are never rewritten. When anything changes and backups
    /// are on, the managed directory is snapshotted first; a failed snapshot
    /// stops the run unless `force` is set.
    pub async fn sync(&self, options: SyncOptions) -> Result<SyncResult> {
        let plan = self.plan(options.preserve_user_content).await?;
        let mut warnings: Vec<String> = check(&plan.config, &plan.descriptors)
            .iter()
            .map(ToString::to_string)
            .collect();
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        let changed: Vec<&PlannedFile> = plan.files.iter().filter(|f| f.entry.is_change()).collect();
        let modified_files: Vec<String> = changed.iter().map(|f| f.entry.file.clone()).collect();

        if changed.is_empty() || options.dry_run {
            tracing::debug!(changes = changed.len(), dry_run = options.dry_run, "Nothing written");
            return Ok(SyncResult {
                success: true,
                modified_files,
                warnings,
                backup_path: None,
                dry_run: options.dry_run,
            });
        }

        let backup = options.backup.unwrap_or(plan.config.sync.backup);
        let manager = self.backup_manager(&plan.config);
        let mut backup_path = None;
        if backup && manager.managed_dir().is_dir() {
            match manager.create() {
                Ok(snapshot) => backup_path = Some(snapshot.path),
                Err(e) if options.force => {
                    tracing::warn!(error = %e, "Backup failed; writing anyway (forced)");
                    warnings.push(format!("Backup failed, continuing because of --force: {e}"));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Backup failed; nothing written");
                    warnings.push(format!("Backup failed, no files were written: {e}"));
                    return Ok(SyncResult {
                        success: false,
                        modified_files: Vec::new(),
                        warnings,
                        backup_path: None,
                        dry_run: false,
                    });
                }
            }
        }

        for file in &changed {
            io::write_atomic(&file.target, &file.content).map_err(|source| Error::SyncIo {
                path: file.target.to_native(),
                source,
            })?;
            tracing::info!(file = %file.entry.file, kind = %file.entry.kind, "Wrote artifact");
        }

        if backup_path.is_some() {
            match manager.prune(plan.config.sync.backup_retention) {
                Ok(removed) if !removed.is_empty() => {
                    tracing::debug!(removed = removed.len(), "Pruned old backups");
                }
                Ok(_) => {}
                Err(e) => warnings.push(format!("Failed to prune backups: {e}")),
            }
        }

        Ok(SyncResult {
            success: true,
            modified_files,
            warnings,
            backup_path,
            dry_run: false,
        })
    }
}
