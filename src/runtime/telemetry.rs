use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs a basic tracing subscriber (if one is not already active).
///
/// The subscriber honours `RUST_LOG` if it is present, otherwise it falls back to
/// `default_directive` (typically the configured log level), and to `info` when
/// that directive does not parse. Calling this function multiple times is harmless.
pub fn init_tracing(default_directive: &str) {
    if TRACING_INIT.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();

    let _ = TRACING_INIT.set(());
}

/// Rolling counters describing what a monitor worker has done since start.
#[derive(Default, Debug)]
pub struct Telemetry {
    checks: AtomicU64,
    failed_checks: AtomicU64,
    changes: AtomicU64,
    summaries: AtomicU64,
}

impl Telemetry {
    pub fn record_check(&self, changed: bool) {
        self.checks.fetch_add(1, Ordering::Relaxed);
        if changed {
            self.changes.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failed_check(&self) {
        self.failed_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_summary(&self) {
        self.summaries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            checks: self.checks.load(Ordering::Relaxed),
            failed_checks: self.failed_checks.load(Ordering::Relaxed),
            changes: self.changes.load(Ordering::Relaxed),
            summaries: self.summaries.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Successful checks.
    pub checks: u64,
    pub failed_checks: u64,
    pub changes: u64,
    pub summaries: u64,
}

impl TelemetrySnapshot {
    pub fn log(&self, site: &str, message: &'static str) {
        tracing::info!(
            target: "sitewatch::metrics",
            site,
            checks = self.checks,
            failed_checks = self.failed_checks,
            changes = self.changes,
            summaries = self.summaries,
            "{message}"
        );
    }
}
