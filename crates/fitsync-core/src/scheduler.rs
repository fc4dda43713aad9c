use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::commands;
use crate::config::ScheduleConfig;
use crate::error::Result;
use crate::manager::BackupManager;

pub fn random_jitter(jitter_seconds: u64) -> Duration {
    if jitter_seconds == 0 {
        return Duration::ZERO;
    }
    let secs = rand::thread_rng().gen_range(0..=jitter_seconds);
    Duration::from_secs(secs)
}

/// Fire a best-effort backup on teardown.
///
/// Runs on a detached thread and is never awaited: the process may exit
/// before the local write flushes, so completion is not observable and the
/// backup may be lost. Callers only get the guarantee that it was initiated.
pub fn spawn_teardown_backup(mgr: Arc<BackupManager>) {
    std::thread::spawn(move || {
        if let Err(e) = commands::create::run(&mgr, true) {
            tracing::warn!(error = %e, "teardown backup failed");
        }
    });
}

/// Recurring backup driver.
///
/// `start` is idempotent activation: the first call spawns the loop thread,
/// every later call is a no-op. The loop fires one immediate backup when
/// `on_startup` is set, then one per interval (plus jitter), ticking once a
/// second against the shutdown flag. When shutdown is observed a final
/// teardown backup is initiated fire-and-forget before the loop exits.
pub struct Scheduler {
    mgr: Arc<BackupManager>,
    schedule: ScheduleConfig,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    started: AtomicBool,
}

impl Scheduler {
    pub fn new(
        mgr: Arc<BackupManager>,
        schedule: ScheduleConfig,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self> {
        let interval = schedule.every_duration()?;
        Ok(Self {
            mgr,
            schedule,
            interval,
            shutdown,
            started: AtomicBool::new(false),
        })
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Activate the scheduler. Returns the loop thread's handle on first
    /// call, `None` when already started.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            return None;
        }

        let mgr = Arc::clone(&self.mgr);
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.interval;
        let schedule = self.schedule.clone();

        tracing::info!(
            interval = ?interval,
            on_startup = schedule.on_startup,
            jitter_seconds = schedule.jitter_seconds,
            "backup scheduler starting"
        );

        Some(std::thread::spawn(move || {
            run_loop(&mgr, &schedule, interval, &shutdown);
        }))
    }
}

/// The scheduler loop body. Blocks until `shutdown` is set; exposed so a
/// daemon front-end can run it on its own thread of choice.
pub fn run_loop(
    mgr: &Arc<BackupManager>,
    schedule: &ScheduleConfig,
    interval: Duration,
    shutdown: &AtomicBool,
) {
    let mut next_run = if schedule.on_startup {
        Instant::now()
    } else {
        Instant::now() + interval + random_jitter(schedule.jitter_seconds)
    };

    loop {
        if shutdown.load(Ordering::SeqCst) {
            tracing::info!("shutdown observed, initiating teardown backup");
            spawn_teardown_backup(Arc::clone(mgr));
            return;
        }

        if Instant::now() >= next_run {
            match commands::create::run(mgr, true) {
                Ok(name) => tracing::info!(backup = %name, "scheduled backup complete"),
                Err(e) => tracing::error!(error = %e, "scheduled backup failed"),
            }
            let delay = interval + random_jitter(schedule.jitter_seconds);
            next_run = Instant::now() + delay;
            tracing::info!(delay = ?delay, "next backup scheduled");
        }

        std::thread::sleep(Duration::from_secs(1));
    }
}
