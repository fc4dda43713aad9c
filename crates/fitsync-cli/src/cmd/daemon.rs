use std::sync::Arc;

use fitsync_core::config::ScheduleConfig;
use fitsync_core::manager::BackupManager;
use fitsync_core::scheduler;

use crate::signal::{install_signal_handlers, SHUTDOWN};

/// Run the recurring backup loop in the foreground until SIGINT/SIGTERM.
///
/// On shutdown the loop initiates one final best-effort backup before the
/// process exits; whether it completes is not observable.
pub(crate) fn run(
    manager: BackupManager,
    every: &str,
    on_startup: bool,
    jitter_seconds: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let schedule = ScheduleConfig {
        every: every.to_string(),
        on_startup,
        jitter_seconds,
    };
    let interval = schedule.every_duration()?;

    install_signal_handlers();

    tracing::info!(
        interval = ?interval,
        on_startup = schedule.on_startup,
        jitter_seconds = schedule.jitter_seconds,
        "backup daemon starting"
    );

    let manager = Arc::new(manager);
    scheduler::run_loop(&manager, &schedule, interval, &SHUTDOWN);

    tracing::info!("shutdown signal received, exiting");
    Ok(())
}
