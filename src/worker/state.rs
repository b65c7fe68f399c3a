use crate::detector::Fingerprint;
use std::time::Duration;
use tokio::time::Instant;

/// Whether a successful check observed new content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Changed,
    Unchanged,
}

/// Counters handed to the summary notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryReport {
    pub checks: u64,
    /// `None` when no check has succeeded yet.
    pub since_last_check: Option<Duration>,
}

/// Mutable scheduling state of a monitor worker.
///
/// Only the worker's event loop writes to it. Failed fetches never reach this
/// type, so they cannot move the counter or the last-check timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckState {
    last_fingerprint: Option<Fingerprint>,
    check_counter: u64,
    last_check: Option<Instant>,
}

impl CheckState {
    /// State right after start; `baseline` is `None` when the initial fetch failed.
    pub fn seeded(baseline: Option<Fingerprint>) -> Self {
        Self {
            last_fingerprint: baseline,
            ..Self::default()
        }
    }

    pub fn last_fingerprint(&self) -> Option<&Fingerprint> {
        self.last_fingerprint.as_ref()
    }

    pub fn check_counter(&self) -> u64 {
        self.check_counter
    }

    pub fn last_check(&self) -> Option<Instant> {
        self.last_check
    }

    /// Applies a successful fetch. An unset baseline compares unequal to any
    /// fingerprint.
    pub fn record_check(&mut self, fingerprint: Fingerprint, now: Instant) -> CheckOutcome {
        self.check_counter += 1;
        self.last_check = Some(now);

        if self.last_fingerprint.as_ref() == Some(&fingerprint) {
            return CheckOutcome::Unchanged;
        }
        self.last_fingerprint = Some(fingerprint);
        CheckOutcome::Changed
    }

    /// Reads the counters for a summary and resets the check counter.
    pub fn take_summary(&mut self, now: Instant) -> SummaryReport {
        let report = SummaryReport {
            checks: self.check_counter,
            since_last_check: self
                .last_check
                .map(|last| now.saturating_duration_since(last)),
        };
        self.check_counter = 0;
        report
    }
}
