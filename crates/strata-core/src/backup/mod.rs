//! Snapshots of the managed directory
//!
//! A snapshot is taken before any sync that would create or modify files,
//! and can be restored or pruned afterwards.

mod manager;

pub use manager::{Backup, BackupFile, BackupManager, BackupMetadata};
