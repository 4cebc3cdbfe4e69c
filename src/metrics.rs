// Operation metrics
//
// Lightweight counters for configuration writes and recorder launches

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters collected over the lifetime of the manager.
///
/// Uses atomic operations so the control surface and background launch tasks
/// can record without locks.
#[derive(Debug)]
pub struct Metrics {
    /// Configuration writes that reached the disk
    pub config_saves: AtomicU64,

    /// Configuration writes that failed and were rolled back
    pub config_save_failures: AtomicU64,

    /// Start requests that reached the launcher
    pub launches_attempted: AtomicU64,

    /// Launches that completed successfully
    pub launches_succeeded: AtomicU64,

    /// Launches that returned an error
    pub launches_failed: AtomicU64,

    /// Start requests ignored because the recorder was already active
    pub launches_skipped: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            config_saves: AtomicU64::new(0),
            config_save_failures: AtomicU64::new(0),
            launches_attempted: AtomicU64::new(0),
            launches_succeeded: AtomicU64::new(0),
            launches_failed: AtomicU64::new(0),
            launches_skipped: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_config_save(&self) {
        self.config_saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_config_save_failure(&self) {
        self.config_save_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_launch_succeeded(&self) {
        self.launches_attempted.fetch_add(1, Ordering::Relaxed);
        self.launches_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_launch_failed(&self) {
        self.launches_attempted.fetch_add(1, Ordering::Relaxed);
        self.launches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_launch_skipped(&self) {
        self.launches_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!(
            "Session: uptime {:.2}s, config saves {} ({} failed)",
            self.uptime().as_secs_f64(),
            self.config_saves.load(Ordering::Relaxed),
            self.config_save_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Launches: {} attempted, {} succeeded, {} failed, {} skipped",
            self.launches_attempted.load(Ordering::Relaxed),
            self.launches_succeeded.load(Ordering::Relaxed),
            self.launches_failed.load(Ordering::Relaxed),
            self.launches_skipped.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
