//! Managed-region parsing and splicing for Strata.
//!
//! A generated file may mix content Strata owns with content a user wrote by
//! hand. The owned span is delimited by a pair of marker lines:
//!
//! ```text
//! <!-- strata:managed:start -->
//! generated content
//! <!-- strata:managed:end -->
//! ```
//!
//! Everything outside the pair is foreign and preserved byte-for-byte when
//! the owned span is rewritten. Files with missing or unbalanced markers are
//! never an error: they are treated as having no managed region.

pub mod editor;
pub mod error;
pub mod markers;
pub mod parser;

pub use editor::ManagedRegionEditor;
pub use error::{Error, Result};
pub use markers::{DEFAULT_TOOL, ManagedMarkers};
pub use parser::{Region, RegionScan};
