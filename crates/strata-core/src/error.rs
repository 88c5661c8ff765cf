//! Error types for strata-core

use std::path::PathBuf;

/// Result type for strata-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in strata-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An `extends` chain revisits a configuration it already contains
    #[error("Circular inheritance: `{reference}` appears twice in {}", chain.join(" -> "))]
    CircularInheritance { reference: String, chain: Vec<String> },

    /// An `extends` chain is longer than the supported depth
    #[error("Inheritance deeper than {max} levels: {}", chain.join(" -> "))]
    MaxDepthExceeded { max: usize, chain: Vec<String> },

    /// An `extends` target does not exist
    #[error("Inherited configuration not found: {reference}")]
    ReferenceNotFound { reference: String },

    /// An `extends` target or profile name cannot be used
    #[error("Invalid reference `{reference}`: {reason}")]
    InvalidReference { reference: String, reason: String },

    /// A remote `extends` target could not be fetched
    #[error("Remote configuration unavailable: {reference}")]
    RemoteUnavailable { reference: String },

    /// The managed directory cannot be used
    #[error("Invalid sync.target_dir `{target}`: {reason}")]
    InvalidTargetDir { target: String, reason: String },

    /// Writing a generated artifact failed
    #[error("Failed to write {}: {source}", path.display())]
    SyncIo {
        path: PathBuf,
        #[source]
        source: strata_fs::Error,
    },

    /// No snapshot with the given id exists
    #[error("Backup not found: {id}")]
    BackupNotFound { id: String },

    /// Snapshot creation, restore, or pruning failed
    #[error("Backup error: {message}")]
    Backup { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from strata-fs
    #[error(transparent)]
    Fs(#[from] strata_fs::Error),

    /// Layer parse or validation error from strata-meta
    #[error(transparent)]
    Meta(#[from] strata_meta::Error),

    /// Marker error from strata-blocks
    #[error(transparent)]
    Blocks(#[from] strata_blocks::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// The reference chain for inheritance failures.
    pub fn chain(&self) -> Option<&[String]> {
        match self {
            Self::CircularInheritance { chain, .. } | Self::MaxDepthExceeded { chain, .. } => {
                Some(chain)
            }
            _ => None,
        }
    }
}
