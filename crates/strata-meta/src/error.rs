//! Error types for strata-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] strata_fs::Error),

    /// Malformed layer syntax
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A layer does not match the schema for its kind
    #[error("Invalid configuration in {} at `{field}`: {message}", path.display())]
    Validation {
        path: PathBuf,
        field: String,
        message: String,
    },
}

impl Error {
    /// The file the error originated from, when known.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Fs(e) => Some(e.path()),
            Self::Parse { path, .. } | Self::Validation { path, .. } => Some(path),
        }
    }

    /// The dotted field path of a validation error.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
