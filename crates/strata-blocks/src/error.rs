//! Error types for strata-blocks

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid marker tool name: {reason}")]
    InvalidTool { reason: String },

    #[error("Managed content line {line} is a managed marker line")]
    MarkerInContent { line: usize },

    #[error("Invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),
}
