use std::time::Duration;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use sitewatch::SiteConfig;
use tokio::time::{sleep, Instant};
use tracing_subscriber::EnvFilter;

static TRACING_SUBSCRIBER: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
});

pub fn init_tracing() {
    Lazy::force(&TRACING_SUBSCRIBER);
}

pub fn site_config(url: &str, interval: Duration, summary_interval: Duration) -> Result<SiteConfig> {
    Ok(SiteConfig::builder()
        .name("mock shop")
        .url(url)
        .check_interval(interval)
        .summary_interval(summary_interval)
        .build()?)
}

/// Polls `condition` every 25ms until it holds or `limit` elapses.
pub async fn wait_until<F>(limit: Duration, what: &str, mut condition: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + limit;
    loop {
        if condition() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            bail!("timed out after {limit:?} waiting for {what}");
        }
        sleep(Duration::from_millis(25)).await;
    }
}
