//! SyncEngine for writing generated artifacts
//!
//! This module provides:
//! - **sync**: write changed artifacts, snapshotting first
//! - **diff**: classify each artifact against disk
//! - **validate**: collect structural findings without writing

mod diff;
mod engine;
mod validate;

pub use diff::{DiffEntry, DiffKind, diff_artifact};
pub use engine::{SyncEngine, SyncOptions, SyncResult};
pub use validate::{ValidationFinding, ValidationReport, check as check_descriptors};
