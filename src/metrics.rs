// Startup and lifecycle metrics
//
// Lock-free counters shared between the launcher, the background task
// queue and the close handler. Summarized in the log at shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct StartupMetrics {
    tasks_run: AtomicU64,
    tasks_failed: AtomicU64,
    update_checks: AtomicU64,
    notifications_scheduled: AtomicU64,
    files_published: AtomicU64,
    start_time: Instant,
}

impl StartupMetrics {
    pub fn new() -> Self {
        Self {
            tasks_run: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
            update_checks: AtomicU64::new(0),
            notifications_scheduled: AtomicU64::new(0),
            files_published: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_task_run(&self) {
        self.tasks_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_update_check(&self) {
        self.update_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification(&self) {
        self.notifications_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_files_published(&self, count: usize) {
        self.files_published
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn tasks_run(&self) -> u64 {
        self.tasks_run.load(Ordering::Relaxed)
    }

    pub fn tasks_failed(&self) -> u64 {
        self.tasks_failed.load(Ordering::Relaxed)
    }

    pub fn update_checks(&self) -> u64 {
        self.update_checks.load(Ordering::Relaxed)
    }

    pub fn notifications_scheduled(&self) -> u64 {
        self.notifications_scheduled.load(Ordering::Relaxed)
    }

    pub fn files_published(&self) -> u64 {
        self.files_published.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "Session: uptime {:.2}s, deferred tasks {} run / {} failed, update checks {}, notifications {}, files published {}",
            self.uptime().as_secs_f64(),
            self.tasks_run(),
            self.tasks_failed(),
            self.update_checks(),
            self.notifications_scheduled(),
            self.files_published()
        );
    }
}

impl Default for StartupMetrics {
    fn default() -> Self {
        Self::new()
    }
}
