//! Command implementations for strata-cli

pub mod backup;
pub mod config;
pub mod diff;
pub mod sync;
pub mod validate;

pub use backup::run_backup;
pub use config::run_config;
pub use diff::run_diff;
pub use sync::{backup_override, run_sync};
pub use validate::run_validate;
