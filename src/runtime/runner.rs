use crate::detector::ChangeDetector;
use crate::notify::Notifier;
use crate::runtime::config::{ConfigError, SiteConfig};
use crate::worker::MonitorWorker;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Owns the monitor worker for the process and stops it on SIGINT or SIGTERM.
pub struct Runner<D: ChangeDetector> {
    worker: MonitorWorker<D>,
    shutdown: CancellationToken,
}

impl<D: ChangeDetector> Runner<D> {
    /// Builds the worker under a root [`CancellationToken`] owned by the runner.
    pub fn new(
        site: SiteConfig,
        detector: D,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Result<Self, ConfigError> {
        let shutdown = CancellationToken::new();
        let worker =
            MonitorWorker::with_cancellation_token(site, detector, notifier, shutdown.clone())?;
        Ok(Self { worker, shutdown })
    }

    /// Clone of the root token; cancelling it has the same effect as a signal.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn worker(&self) -> &MonitorWorker<D> {
        &self.worker
    }

    pub async fn start(&mut self) -> Result<()> {
        self.worker.start().await?;
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.shutdown.cancel();
        self.worker.stop().await?;
        Ok(())
    }

    /// Starts the worker and blocks until SIGINT, SIGTERM, or cancellation of
    /// the root token, then stops it.
    pub async fn run_until_signal(&mut self) -> Result<()> {
        self.start().await?;
        tracing::info!(
            name = self.worker.site().name(),
            "runner started; waiting for SIGINT or SIGTERM to initiate shutdown"
        );

        tokio::select! {
            res = signal::ctrl_c() => {
                res.context("failed to listen for SIGINT")?;
                tracing::info!("SIGINT received; shutting down runner");
            }
            res = terminate() => {
                res.context("failed to listen for SIGTERM")?;
                tracing::info!("SIGTERM received; shutting down runner");
            }
            _ = self.shutdown.cancelled() => {
                tracing::info!("runner shutdown token cancelled");
            }
        }

        self.stop().await?;
        tracing::info!("runner stopped");
        Ok(())
    }
}

#[cfg(unix)]
async fn terminate() -> std::io::Result<()> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn terminate() -> std::io::Result<()> {
    std::future::pending().await
}
