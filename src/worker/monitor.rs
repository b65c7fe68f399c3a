use crate::detector::ChangeDetector;
use crate::notify::Notifier;
use crate::runtime::config::{ConfigError, SiteConfig};
use crate::runtime::telemetry::Telemetry;
use crate::worker::event_loop::{EventLoop, Timers};
use crate::worker::lifecycle::LifecycleHandles;
use crate::worker::state::CheckState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinError;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("worker already running")]
    AlreadyRunning,
    #[error("worker has been stopped and cannot be restarted")]
    Stopped,
    #[error("worker event loop terminated abnormally: {0}")]
    EventLoop(#[from] JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    Created,
    Running,
    Stopped,
}

enum Lifecycle {
    Created { state_tx: watch::Sender<CheckState> },
    Running(LifecycleHandles),
    Stopped,
}

/// Watches a single site: takes a baseline on start, then checks and
/// summarizes on two independent timers until stopped.
///
/// Lifecycle is `Created → Running → Stopped`; a stopped worker cannot be
/// restarted. `stop()` outside the running state is a no-op.
pub struct MonitorWorker<D: ChangeDetector> {
    site: SiteConfig,
    name: Arc<str>,
    url: Arc<str>,
    detector: Arc<D>,
    notifier: Arc<dyn Notifier>,
    telemetry: Arc<Telemetry>,
    shutdown_root: CancellationToken,
    state_rx: watch::Receiver<CheckState>,
    lifecycle: Lifecycle,
}

impl<D: ChangeDetector> MonitorWorker<D> {
    /// Validates `site` and the notifier capability and returns a worker in the
    /// `Created` state.
    pub fn new(
        site: SiteConfig,
        detector: D,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Result<Self, ConfigError> {
        Self::with_cancellation_token(site, detector, notifier, CancellationToken::new())
    }

    /// Like [`Self::new`], but the event loop also exits when `shutdown_token`
    /// is cancelled.
    pub fn with_cancellation_token(
        site: SiteConfig,
        detector: D,
        notifier: Option<Arc<dyn Notifier>>,
        shutdown_token: CancellationToken,
    ) -> Result<Self, ConfigError> {
        tracing::info!(
            url = site.url(),
            name = site.name(),
            interval = ?site.check_interval(),
            summary_interval = ?site.summary_interval(),
            "creating new worker"
        );

        site.validate()?;
        let notifier = notifier.ok_or(ConfigError::MissingNotifier)?;
        let (state_tx, state_rx) = watch::channel(CheckState::default());

        Ok(Self {
            name: Arc::from(site.name()),
            url: Arc::from(site.url()),
            site,
            detector: Arc::new(detector),
            notifier,
            telemetry: Arc::new(Telemetry::default()),
            shutdown_root: shutdown_token,
            state_rx,
            lifecycle: Lifecycle::Created { state_tx },
        })
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub fn status(&self) -> WorkerStatus {
        match self.lifecycle {
            Lifecycle::Created { .. } => WorkerStatus::Created,
            Lifecycle::Running(_) => WorkerStatus::Running,
            Lifecycle::Stopped => WorkerStatus::Stopped,
        }
    }

    /// `true` while the event loop task is alive.
    pub fn is_active(&self) -> bool {
        match &self.lifecycle {
            Lifecycle::Running(handles) => !handles.is_finished(),
            _ => false,
        }
    }

    /// Copy of the loop's state as of its last completed event.
    pub fn state(&self) -> CheckState {
        self.state_rx.borrow().clone()
    }

    /// Receiver that observes the loop's state after every event.
    pub fn subscribe(&self) -> watch::Receiver<CheckState> {
        self.state_rx.clone()
    }

    pub fn telemetry(&self) -> Arc<Telemetry> {
        self.telemetry.clone()
    }

    /// Token that ends the event loop when cancelled from any context. Callers
    /// still use [`Self::stop`] to wait for the loop to exit.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_root.clone()
    }

    /// Establishes both timers, takes the baseline fingerprint, sends the start
    /// notification and spawns the event loop.
    ///
    /// A failed baseline fetch leaves the fingerprint unset and does not prevent
    /// startup or the start notification.
    pub async fn start(&mut self) -> Result<(), WorkerError> {
        let state_tx = match std::mem::replace(&mut self.lifecycle, Lifecycle::Stopped) {
            Lifecycle::Created { state_tx } => state_tx,
            running @ Lifecycle::Running(_) => {
                self.lifecycle = running;
                return Err(WorkerError::AlreadyRunning);
            }
            Lifecycle::Stopped => return Err(WorkerError::Stopped),
        };

        tracing::debug!(url = %self.url, "starting worker");
        let timers = self.establish_timers();

        let baseline = match self.detector.fetch_fingerprint(&self.url).await {
            Ok(fingerprint) => Some(fingerprint),
            Err(err) => {
                tracing::warn!(
                    url = %self.url,
                    error = %err,
                    "baseline fetch failed; first successful check will count as a change"
                );
                None
            }
        };
        let state = CheckState::seeded(baseline);
        state_tx.send_replace(state.clone());

        let message = format!("Started monitoring {}", self.name);
        self.notifier.notify_start(&message, &self.url).await;

        let event_loop = EventLoop {
            name: self.name.clone(),
            url: self.url.clone(),
            summary_period: self.site.summary_period(),
            detector: self.detector.clone(),
            notifier: self.notifier.clone(),
            telemetry: self.telemetry.clone(),
            state,
            state_tx,
        };
        let handles = LifecycleHandles::spawn(&self.shutdown_root, event_loop, timers);
        self.lifecycle = Lifecycle::Running(handles);

        tracing::info!(url = %self.url, name = %self.name, "worker started");
        Ok(())
    }

    /// Cancels both timers and waits until the event loop has exited. No
    /// notification is sent by this worker once this returns.
    pub async fn stop(&mut self) -> Result<(), WorkerError> {
        let handles = match std::mem::replace(&mut self.lifecycle, Lifecycle::Stopped) {
            Lifecycle::Running(handles) => handles,
            other => {
                self.lifecycle = other;
                tracing::debug!(url = %self.url, "stop ignored; worker is not running");
                return Ok(());
            }
        };

        tracing::debug!(url = %self.url, "stopping worker");
        handles.shutdown().await?;
        self.telemetry.snapshot().log(&self.name, "stopped worker");
        Ok(())
    }

    fn establish_timers(&self) -> Timers {
        let now = Instant::now();
        Timers {
            check: periodic(now, self.site.check_interval()),
            summary: periodic(now, self.site.summary_period()),
        }
    }
}

impl<D: ChangeDetector> Drop for MonitorWorker<D> {
    fn drop(&mut self) {
        if let Lifecycle::Running(handles) = &self.lifecycle {
            handles.cancel();
        }
    }
}

/// Longest period a worker timer runs at. Configured intervals are unbounded,
/// and adding `Duration::MAX` to an `Instant` overflows.
const MAX_TIMER_PERIOD: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// First tick one full period after `start`, unlike `tokio::time::interval`.
fn periodic(start: Instant, period: Duration) -> Interval {
    let period = period.min(MAX_TIMER_PERIOD);
    let mut timer = interval_at(start + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}
