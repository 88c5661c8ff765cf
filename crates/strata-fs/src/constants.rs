//! Constants and enums for Strata filesystem paths.

use std::path::Path;

/// Well-known file and directory names used by Strata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrataPath {
    /// The `.strata` directory at a project root
    ProjectDir,
    /// The project layer file inside `.strata/`
    ProjectConfig,
    /// The git-ignored local layer file inside `.strata/`
    LocalConfig,
    /// Snapshot storage inside `.strata/`
    BackupsDir,
    /// Capability descriptor input inside `.strata/`
    Capabilities,
    /// The global layer file inside the global directory
    GlobalConfig,
    /// Profile storage inside the global directory
    ProfilesDir,
    /// Single-line pointer naming the active profile
    ActiveProfile,
    /// Metadata file written into every snapshot
    BackupMetadata,
    /// Directory inside a snapshot holding the copied tree
    BackupFiles,
}

impl StrataPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectDir => ".strata",
            Self::ProjectConfig | Self::GlobalConfig => "config.toml",
            Self::LocalConfig => "config.local.toml",
            Self::BackupsDir => "backups",
            Self::Capabilities => "capabilities.json",
            Self::ProfilesDir => "profiles",
            Self::ActiveProfile => "active-profile",
            Self::BackupMetadata => "backup.toml",
            Self::BackupFiles => "files",
        }
    }
}

impl AsRef<Path> for StrataPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for StrataPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for StrataPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
