// Request metrics module
//
// Provides lightweight counters for what the dashboard backend served

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-wide service counters
///
/// Uses atomic operations for thread-safe tracking without locks. Handlers
/// record into a shared instance; the totals are logged on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// IDE actions dispatched (format, lint, preview)
    pub ide_actions: AtomicU64,

    /// Sibling CSS/JS files injected into HTML previews
    pub resources_injected: AtomicU64,

    /// Sibling files listed but unreadable
    pub resources_skipped: AtomicU64,

    /// Requests forwarded by the API tester
    pub proxied_requests: AtomicU64,

    /// Outbound calls (API tester or GitHub) that failed in transport or were rejected
    pub upstream_failures: AtomicU64,

    /// Completed GitHub logins and token links
    pub logins_completed: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            ide_actions: AtomicU64::new(0),
            resources_injected: AtomicU64::new(0),
            resources_skipped: AtomicU64::new(0),
            proxied_requests: AtomicU64::new(0),
            upstream_failures: AtomicU64::new(0),
            logins_completed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_ide_action(&self) {
        self.ide_actions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one resource pipeline run
    pub fn record_resources(&self, injected: usize, skipped: usize) {
        self.resources_injected
            .fetch_add(injected as u64, Ordering::Relaxed);
        self.resources_skipped
            .fetch_add(skipped as u64, Ordering::Relaxed);
    }

    pub fn record_proxied_request(&self) {
        self.proxied_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_login(&self) {
        self.logins_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Service Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "IDE actions: {}, resources injected: {}, skipped: {}",
            self.ide_actions.load(Ordering::Relaxed),
            self.resources_injected.load(Ordering::Relaxed),
            self.resources_skipped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Proxied requests: {}, upstream failures: {}",
            self.proxied_requests.load(Ordering::Relaxed),
            self.upstream_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "GitHub logins: {}",
            self.logins_completed.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
