//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Strata - layered agent configuration, synced into your project
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Resolve this profile instead of the selected one
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Project root (default: nearest directory containing .strata/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Global configuration directory (default: $STRATA_HOME or the platform config dir)
    #[arg(long, global = true)]
    pub global_dir: Option<PathBuf>,

    /// Capability descriptor file (default: <project>/.strata/capabilities.json)
    #[arg(long, global = true)]
    pub capabilities: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write generated artifacts into the managed directory
    ///
    /// Only files whose content changed are written. The managed directory
    /// is snapshotted first unless backups are off.
    ///
    /// Examples:
    ///   strata sync                 # Sync using the selected profile
    ///   strata sync --dry-run       # Show what would be written
    ///   strata sync --no-backup     # Skip the snapshot
    Sync {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Write even if the snapshot fails
        #[arg(long)]
        force: bool,

        /// Snapshot before writing, overriding sync.backup
        #[arg(long, conflicts_with = "no_backup")]
        backup: bool,

        /// Do not snapshot before writing
        #[arg(long)]
        no_backup: bool,

        /// Replace files outright instead of splicing managed regions
        #[arg(long)]
        no_preserve: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Preview what sync would change
    Diff {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check configuration and capability descriptors
    Validate {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,

        /// Also list which layers contributed
        #[arg(long)]
        layers: bool,
    },

    /// Manage snapshots of the managed directory
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },
}

/// Backup subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BackupAction {
    /// Snapshot the managed directory now
    Create,

    /// List snapshots, newest first
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Replace the managed directory with a snapshot
    Restore {
        /// Snapshot id, as shown by `strata backup list`
        id: String,
    },

    /// Delete all but the newest snapshots
    Prune {
        /// Number of snapshots to keep
        #[arg(long)]
        keep: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_sync_flags() {
        let cli = Cli::parse_from(["strata", "sync", "--dry-run", "--no-backup", "--json"]);
        assert_eq!(
            cli.command,
            Some(Commands::Sync {
                dry_run: true,
                force: false,
                backup: false,
                no_backup: true,
                no_preserve: false,
                json: true,
            })
        );
    }

    #[test]
    fn backup_flags_conflict() {
        let result = Cli::try_parse_from(["strata", "sync", "--backup", "--no-backup"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "strata",
            "config",
            "--profile",
            "work",
            "--global-dir",
            "/tmp/strata",
        ]);
        assert_eq!(cli.profile.as_deref(), Some("work"));
        assert_eq!(cli.global_dir, Some(PathBuf::from("/tmp/strata")));
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                json: false,
                layers: false
            })
        );
    }

    #[test]
    fn parse_backup_prune() {
        let cli = Cli::parse_from(["strata", "backup", "prune", "--keep", "3"]);
        assert_eq!(
            cli.command,
            Some(Commands::Backup {
                action: BackupAction::Prune { keep: 3 }
            })
        );
    }

    #[test]
    fn prune_requires_keep() {
        assert!(Cli::try_parse_from(["strata", "backup", "prune"]).is_err());
    }
}
