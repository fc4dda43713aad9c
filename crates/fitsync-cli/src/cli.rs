use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fitsync",
    version,
    about = "Backup, restore, and reconcile fitsync application state",
    after_help = "\
Environment variables:
  FITSYNC_TOKEN   Bearer token for the backup API (omit for open servers)"
)]
pub(crate) struct Cli {
    /// Directory holding the persisted application state
    #[arg(short, long, default_value = "fitsync-state")]
    pub state_dir: String,

    /// Base URL of the backup API server
    #[arg(short = 'u', long, default_value = "http://localhost:8686")]
    pub server_url: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Snapshot all state domains into a new backup
    Create,

    /// List local and server backups as one reconciled view
    List,

    /// Rehydrate all state domains from a backup
    Restore {
        /// Backup name, with or without the fitness-app-backup prefix
        name: String,
    },

    /// Delete a backup locally and on the server
    Delete {
        /// Backup name, with or without the fitness-app-backup prefix
        name: String,
    },

    /// Run the recurring backup scheduler in the foreground
    Daemon {
        /// Interval between automatic backups, e.g. "30m", "24h"
        #[arg(long, default_value = "24h")]
        every: String,

        /// Skip the immediate backup normally fired on startup
        #[arg(long)]
        no_startup_backup: bool,

        /// Random extra delay added to each interval, in seconds
        #[arg(long, default_value_t = 0)]
        jitter_seconds: u64,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Create => "create",
            Commands::List => "list",
            Commands::Restore { .. } => "restore",
            Commands::Delete { .. } => "delete",
            Commands::Daemon { .. } => "daemon",
        }
    }
}
