//! Snapshot storage for the managed directory
//!
//! Each snapshot lives in `<backups>/<id>/` with a `backup.toml` metadata
//! file and a `files/` copy of the managed tree.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use strata_fs::checksum::compute_file_checksum;
use strata_fs::{NormalizedPath, StrataPath, io, validate_path_identifier};
use uuid::Uuid;

/// A file captured in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupFile {
    /// Forward-slash path relative to the managed directory
    pub path: String,
    pub checksum: String,
}

/// Contents of `backup.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// The managed directory the snapshot was taken from
    pub source: String,
    #[serde(default)]
    pub files: Vec<BackupFile>,
}

/// A snapshot on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub id: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub files: Vec<String>,
}

impl Backup {
    fn from_metadata(metadata: BackupMetadata, path: &NormalizedPath) -> Self {
        Self {
            id: metadata.id,
            path: path.as_str().to_string(),
            created_at: metadata.created_at,
            files: metadata.files.into_iter().map(|f| f.path).collect(),
        }
    }
}

/// Creates, lists, restores and prunes snapshots of one managed directory.
#[derive(Debug, Clone)]
pub struct BackupManager {
    backups_dir: NormalizedPath,
    managed_dir: NormalizedPath,
}

impl BackupManager {
    pub fn new(backups_dir: NormalizedPath, managed_dir: NormalizedPath) -> Self {
        Self {
            backups_dir: backups_dir.clean(),
            managed_dir: managed_dir.clean(),
        }
    }

    pub fn backups_dir(&self) -> &NormalizedPath {
        &self.backups_dir
    }

    pub fn managed_dir(&self) -> &NormalizedPath {
        &self.managed_dir
    }

    /// Whether either directory contains the other. Snapshotting or
    /// restoring such a layout would copy or delete the snapshots themselves.
    pub fn overlaps_backups(&self) -> bool {
        self.backups_dir.is_within(&self.managed_dir) || self.managed_dir.is_within(&self.backups_dir)
    }

    fn check_layout(&self) -> Result<()> {
        if self.overlaps_backups() {
            return Err(Error::Backup {
                message: format!(
                    "managed directory {} overlaps the backup directory {}",
                    self.managed_dir, self.backups_dir
                ),
            });
        }
        Ok(())
    }

    fn snapshot_dir(&self, id: &str) -> NormalizedPath {
        self.backups_dir.join(id)
    }

    fn validate_id(id: &str) -> Result<()> {
        validate_path_identifier(id, "Backup id").map_err(|message| Error::Backup { message })
    }

    /// Snapshot the whole managed directory.
    ///
    /// Ids are a UTC timestamp with nanosecond precision plus a random
    /// suffix, so they sort by creation time and never collide.
    pub fn create(&self) -> Result<Backup> {
        self.check_layout()?;
        if !self.managed_dir.is_dir() {
            return Err(Error::Backup {
                message: format!("nothing to back up: {} does not exist", self.managed_dir),
            });
        }

        let created_at = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!(
            "{}-{}",
            created_at.format("%Y%m%dT%H%M%S%.9fZ"),
            &suffix[..8]
        );
        let dir = self.snapshot_dir(&id);
        let files_dir = dir.join(StrataPath::BackupFiles.as_str());

        let copied = io::copy_tree(&self.managed_dir.to_native(), &files_dir.to_native())
            .map_err(|e| self.failed("copy managed directory", e))?;

        let mut files = Vec::with_capacity(copied.len());
        for rel in copied {
            let checksum = compute_file_checksum(&files_dir.join(&rel).to_native())?;
            files.push(BackupFile { path: rel, checksum });
        }

        let metadata = BackupMetadata {
            id: id.clone(),
            created_at,
            source: self.managed_dir.as_str().to_string(),
            files,
        };
        let content = toml::to_string_pretty(&metadata)?;
        io::write_atomic(&dir.join(StrataPath::BackupMetadata.as_str()), content.as_bytes())
            .map_err(|e| self.failed("write backup metadata", e))?;

        tracing::info!(%id, files = metadata.files.len(), "Created backup");
        Ok(Backup::from_metadata(metadata, &dir))
    }

    fn failed(&self, action: &str, error: strata_fs::Error) -> Error {
        Error::Backup {
            message: format!("failed to {action}: {error}"),
        }
    }

    /// Look up one snapshot.
    pub fn get(&self, id: &str) -> Result<Backup> {
        Self::validate_id(id)?;
        let dir = self.snapshot_dir(id);
        let metadata_path = dir.join(StrataPath::BackupMetadata.as_str());
        let content = io::read_optional_text(&metadata_path)?.ok_or_else(|| Error::BackupNotFound {
            id: id.to_string(),
        })?;
        let metadata: BackupMetadata = toml::from_str(&content)?;
        Ok(Backup::from_metadata(metadata, &dir))
    }

    /// All snapshots, newest first; ties are broken by id, descending.
    pub fn list(&self) -> Result<Vec<Backup>> {
        let native = self.backups_dir.to_native();
        let entries = match fs::read_dir(&native) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(strata_fs::Error::io(&native, e).into()),
        };

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| strata_fs::Error::io(&native, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            let Some(id) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            match self.get(&id) {
                Ok(backup) => backups.push(backup),
                Err(e) => tracing::warn!(%id, error = %e, "Skipping unreadable backup"),
            }
        }

        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(backups)
    }

    /// Copy a snapshot back over the managed directory.
    ///
    /// The managed directory is replaced, so files created after the
    /// snapshot are removed. The snapshot is staged next to the managed
    /// directory and renamed into place, so a failed copy leaves the current
    /// directory untouched. Returns the restored files.
    pub fn restore(&self, id: &str) -> Result<Vec<String>> {
        self.check_layout()?;
        let backup = self.get(id)?;
        let files_dir = self
            .snapshot_dir(id)
            .join(StrataPath::BackupFiles.as_str());

        let staging = self.sibling_path("restore")?;
        let staged = if files_dir.is_dir() {
            io::copy_tree(&files_dir.to_native(), &staging)
        } else {
            fs::create_dir_all(&staging)
                .map(|()| Vec::new())
                .map_err(|e| strata_fs::Error::io(&staging, e))
        };
        let restored = match staged {
            Ok(restored) => restored,
            Err(e) => {
                discard(&staging);
                return Err(e.into());
            }
        };

        let managed = self.managed_dir.to_native();
        let displaced = self.sibling_path("previous")?;
        let had_managed = managed.exists();
        if had_managed && let Err(e) = fs::rename(&managed, &displaced) {
            discard(&staging);
            return Err(strata_fs::Error::io(&managed, e).into());
        }
        if let Err(e) = fs::rename(&staging, &managed) {
            if had_managed && let Err(back) = fs::rename(&displaced, &managed) {
                tracing::error!(path = ?displaced, error = %back, "Could not put managed directory back");
            }
            discard(&staging);
            return Err(strata_fs::Error::io(&managed, e).into());
        }
        if had_managed {
            discard(&displaced);
        }

        tracing::info!(id = %backup.id, files = restored.len(), "Restored backup");
        Ok(restored)
    }

    /// A hidden path next to the managed directory, on the same filesystem.
    fn sibling_path(&self, label: &str) -> Result<PathBuf> {
        let (Some(parent), Some(name)) = (self.managed_dir.parent(), self.managed_dir.file_name())
        else {
            return Err(Error::Backup {
                message: format!("cannot restore into {}", self.managed_dir),
            });
        };
        let suffix = Uuid::new_v4().simple().to_string();
        Ok(parent
            .join(&format!(".{name}.{label}-{}", &suffix[..8]))
            .to_native())
    }

    /// Delete every snapshot past the newest `keep`. Returns the removed ids.
    pub fn prune(&self, keep: usize) -> Result<Vec<String>> {
        let mut removed = Vec::new();
        for backup in self.list()?.into_iter().skip(keep) {
            io::remove_dir_if_exists(&self.snapshot_dir(&backup.id).to_native())?;
            tracing::debug!(id = %backup.id, "Pruned backup");
            removed.push(backup.id);
        }
        Ok(removed)
    }
}

/// Best-effort removal of a leftover staging directory.
fn discard(path: &std::path::Path) {
    if let Err(e) = io::remove_dir_if_exists(path) {
        tracing::warn!(?path, error = %e, "Could not remove leftover directory");
    }
}
