//! The serialized event loop that drives checks and summaries for one site.

use crate::detector::ChangeDetector;
use crate::notify::Notifier;
use crate::runtime::duration::format_duration;
use crate::runtime::telemetry::Telemetry;
use crate::worker::state::{CheckOutcome, CheckState, SummaryReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, Interval};
use tokio_util::sync::CancellationToken;

pub const CHANGE_TITLE: &str = "Site changed!";

/// Everything the loop needs to run `on_check` and `on_summary`.
pub(crate) struct EventLoop<D: ChangeDetector> {
    pub name: Arc<str>,
    pub url: Arc<str>,
    pub summary_period: Duration,
    pub detector: Arc<D>,
    pub notifier: Arc<dyn Notifier>,
    pub telemetry: Arc<Telemetry>,
    pub state: CheckState,
    pub state_tx: watch::Sender<CheckState>,
}

/// The two periodic timers established by `start()`.
pub(crate) struct Timers {
    pub check: Interval,
    pub summary: Interval,
}

impl<D: ChangeDetector> EventLoop<D> {
    /// Processes one event at a time until `shutdown` is cancelled. When several
    /// sources are ready at once, stop wins, then summary, then check. The
    /// summary timer is ready at most once per period, so checks that run back
    /// to back behind a slow fetch cannot starve it.
    pub(crate) async fn run(mut self, timers: Timers, shutdown: CancellationToken) {
        let Timers {
            mut check,
            mut summary,
        } = timers;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    break;
                }
                _ = summary.tick() => {
                    self.on_summary().await;
                }
                _ = check.tick() => {
                    self.on_check().await;
                }
            }
            self.publish();
        }

        tracing::debug!(url = %self.url, "stopped worker event loop");
    }

    async fn on_check(&mut self) {
        tracing::debug!(url = %self.url, "checking for changes");

        let fingerprint = match self.detector.fetch_fingerprint(&self.url).await {
            Ok(fingerprint) => fingerprint,
            Err(err) => {
                self.telemetry.record_failed_check();
                tracing::warn!(
                    url = %self.url,
                    error = %err,
                    "fetch failed; treating as unchanged"
                );
                return;
            }
        };

        let outcome = self.state.record_check(fingerprint, Instant::now());
        self.telemetry.record_check(outcome == CheckOutcome::Changed);

        match outcome {
            CheckOutcome::Changed => {
                tracing::info!(url = %self.url, "site changed");
                let message = format!("{} has changed", self.name);
                self.notifier
                    .notify_change(CHANGE_TITLE, &message, &self.url)
                    .await;
            }
            CheckOutcome::Unchanged => {
                tracing::info!(url = %self.url, "no change detected");
            }
        }
    }

    async fn on_summary(&mut self) {
        tracing::info!(url = %self.url, "preparing summary");

        let report = self.state.take_summary(Instant::now());
        let title = format!("{} summary", self.name);
        let message = summary_message(&report, self.summary_period);
        self.notifier.send_summary(&title, &message, &self.url).await;

        self.telemetry.record_summary();
        self.telemetry
            .snapshot()
            .log(&self.name, "worker activity at summary");
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

pub(crate) fn summary_message(report: &SummaryReport, period: Duration) -> String {
    let head = format!(
        "{} checks in the last {}.",
        report.checks,
        format_duration(period)
    );
    match report.since_last_check {
        Some(elapsed) => format!("{head} Last check was {} ago", format_duration(elapsed)),
        None => format!("{head} No successful check yet"),
    }
}
