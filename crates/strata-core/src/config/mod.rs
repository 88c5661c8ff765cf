//! Configuration resolution
//!
//! # Configuration Hierarchy
//!
//! Configuration is merged from these sources (later sources override earlier):
//!
//! 1. **Built-in defaults**
//! 2. **Global** - `<global>/config.toml`
//! 3. **Profile** - `<global>/profiles/<name>.toml`, selected by an explicit
//!    override, the project layer's `profile` key, or `<global>/active-profile`
//! 4. **Project** - `.strata/config.toml`
//! 5. **Local overrides** - `.strata/config.local.toml` (git-ignored)
//!
//! Profile and project layers may `extends` another configuration; the chain
//! is merged ancestor-first before the layer takes its place above.
//!
//! # Example
//!
//! ```ignore
//! use strata_core::config::ConfigResolver;
//! use strata_fs::NormalizedPath;
//!
//! let resolver = ConfigResolver::new(
//!     NormalizedPath::new("/path/to/project"),
//!     NormalizedPath::new("/home/me/.config/strata"),
//! );
//! let config = resolver.resolve(None, None).await?;
//! println!("Model: {:?}", config.model.default);
//! ```

mod effective;
mod inheritance;
mod merge;
mod resolver;

pub use effective::{
    AgentConfig, CostConfig, DEFAULT_BACKUP_RETENTION, DEFAULT_MODEL, DEFAULT_PROFILE,
    DEFAULT_TARGET_DIR, DEFAULT_WARN_THRESHOLD, EffectiveConfiguration, McpConfig, McpServer,
    ModelConfig, ProfileInfo, ProfileSource, SkillsConfig, SyncSettings, TeamConfig,
    builtin_defaults,
};
pub use inheritance::{
    CachingLoader, InheritanceNode, Inherited, LocalReferenceLoader, MAX_INHERITANCE_DEPTH,
    OfflineFetcher, Reference, ReferenceDispatcher, ReferenceLoader, RemoteFetcher,
    RemoteReferenceLoader, resolve_inheritance,
};
pub use merge::{ToggleSet, deep_merge, merge};
pub use resolver::{
    ConfigResolver, LayerProvenance, ResolvedConfiguration, STRATA_HOME_ENV, default_global_dir,
};
