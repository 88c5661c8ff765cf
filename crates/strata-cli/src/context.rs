//! Project and global directory detection
//!
//! Commands work from any subdirectory of a project: the root is the nearest
//! ancestor holding a `.strata/` directory, like git looks for `.git/`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use strata_core::{ConfigResolver, JsonFileCapabilities, SyncEngine, default_global_dir};
use strata_fs::{NormalizedPath, StrataPath};

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Walk up from `cwd` to the nearest directory containing `.strata/`.
///
/// Falls back to `cwd` itself so a fresh project can be synced before it
/// has any configuration.
pub fn find_project_root(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .find(|dir| dir.join(StrataPath::ProjectDir.as_str()).is_dir())
        .unwrap_or(cwd)
        .to_path_buf()
}

/// Paths every command needs, resolved from the global flags.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_root: NormalizedPath,
    pub global_dir: NormalizedPath,
    pub capabilities: NormalizedPath,
    pub profile: Option<String>,
}

impl CommandContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let root = match &cli.project {
            Some(project) => cwd.join(project),
            None => find_project_root(&cwd),
        };
        let project_root = NormalizedPath::new(root);

        let global_dir = match &cli.global_dir {
            Some(dir) => NormalizedPath::new(cwd.join(dir)),
            None => default_global_dir().ok_or_else(|| {
                CliError::user(
                    "Could not determine the global configuration directory; pass --global-dir or set STRATA_HOME",
                )
            })?,
        };

        let capabilities = match &cli.capabilities {
            Some(path) => NormalizedPath::new(cwd.join(path)),
            None => project_root
                .join(StrataPath::ProjectDir.as_str())
                .join(StrataPath::Capabilities.as_str()),
        };

        tracing::debug!(
            root = %project_root,
            global = %global_dir,
            capabilities = %capabilities,
            "Resolved command context"
        );

        Ok(Self {
            project_root,
            global_dir,
            capabilities,
            profile: cli.profile.clone(),
        })
    }

    pub fn resolver(&self) -> ConfigResolver {
        ConfigResolver::new(self.project_root.clone(), self.global_dir.clone())
    }

    pub fn engine(&self) -> SyncEngine {
        let source = JsonFileCapabilities::new(self.capabilities.clone());
        SyncEngine::new(self.resolver(), Arc::new(source)).with_profile(self.profile.clone())
    }
}
