//! Filesystem primitives for Strata
//!
//! Provides normalized path handling, the single "load or empty" read
//! primitive shared by every layer loader, atomic writes, and recursive tree
//! copies used by snapshots.

pub mod checksum;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use constants::StrataPath;
pub use error::{Error, Result};
pub use path::{NormalizedPath, validate_path_identifier};
