mod cli;
mod cmd;
mod signal;

use clap::Parser;

use fitsync_core::config::BackupConfig;
use fitsync_core::manager::BackupManager;
use fitsync_core::store::LocalStore;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Initialize logging; the daemon auto-upgrades to info
    let filter = match cli.verbose {
        0 if matches!(cli.command, Commands::Daemon { .. }) => "info",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let store = match LocalStore::open(&cli.state_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: cannot open state directory '{}': {e}", cli.state_dir);
            std::process::exit(1);
        }
    };

    let mut config = BackupConfig::new(cli.server_url.clone());
    config.token = std::env::var("FITSYNC_TOKEN").ok().filter(|t| !t.is_empty());
    let manager = BackupManager::new(Box::new(store), config);

    tracing::debug!(command = cli.command.name(), state_dir = %cli.state_dir, "dispatching");

    let result = match &cli.command {
        Commands::Create => cmd::create::run(&manager),
        Commands::List => cmd::list::run(&manager),
        Commands::Restore { name } => cmd::restore::run(&manager, name),
        Commands::Delete { name } => cmd::delete::run(&manager, name),
        Commands::Daemon {
            every,
            no_startup_backup,
            jitter_seconds,
        } => cmd::daemon::run(manager, every, !no_startup_backup, *jitter_seconds),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
