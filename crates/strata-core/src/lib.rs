//! Configuration resolution and artifact synchronization for Strata
//!
//! This crate sits above the layer crates and below the CLI:
//!
//! - **Configuration resolution**: layered merge of defaults, global,
//!   profile, project and local configuration with `extends` inheritance
//! - **Rendering**: pure functions from configuration and capability
//!   descriptors to artifact bytes
//! - **SyncEngine**: sync, diff and validate for the managed directory
//! - **Backups**: snapshot, restore, list and prune
//!
//! # Architecture
//!
//! ```text
//!                    strata-cli
//!                        |
//!                   strata-core
//!                        |
//!        +---------------+---------------+
//!        |               |               |
//!   strata-meta    strata-blocks     strata-fs
//! ```

pub mod backup;
pub mod capability;
pub mod config;
pub mod error;
pub mod render;
pub mod sync;

pub use backup::{Backup, BackupManager, BackupMetadata};
pub use capability::{
    CapabilityDescriptor, CapabilitySource, HookBinding, JsonFileCapabilities, StaticCapabilities,
};
pub use config::{
    ConfigResolver, EffectiveConfiguration, LayerProvenance, ProfileSource, ResolvedConfiguration,
    default_global_dir,
};
pub use error::{Error, Result};
pub use render::{RenderedArtifact, render_all};
pub use sync::{
    DiffEntry, DiffKind, SyncEngine, SyncOptions, SyncResult, ValidationFinding, ValidationReport,
};
