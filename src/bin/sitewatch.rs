use anyhow::{Context, Result};
use sitewatch::{init_tracing, AppConfig, HttpChangeDetector, Notifier, PushoverNotifier, Runner};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(config.log().level());
    tracing::info!(path = %AppConfig::config_path().display(), "loaded configuration");

    let pushover = PushoverNotifier::new(config.pushover())?;
    if let Err(err) = pushover.validate() {
        tracing::warn!(error = %err, "pushover credentials incomplete; deliveries will be rejected");
    }
    let notifier: Arc<dyn Notifier> = Arc::new(pushover);

    let detector = HttpChangeDetector::new()?;
    let mut runner = Runner::new(config.site().clone(), detector, Some(notifier))
        .context("invalid site configuration")?;
    runner.run_until_signal().await
}
