use std::{sync::Arc, time::Duration};

use crate::support::{
    helpers::{init_tracing, site_config, wait_until},
    mock_site::{MockSiteServer, SiteState},
};
use anyhow::Result;
use sitewatch::{
    notify::START_TITLE, worker::CHANGE_TITLE, HttpChangeDetector, MonitorWorker, Notifier,
    PushoverConfig, PushoverNotifier, Runner, WorkerStatus,
};
use tokio::time::{sleep, timeout};

fn pushover(server: &MockSiteServer) -> Result<Arc<dyn Notifier>> {
    let config = PushoverConfig::new("app-token", "user-key", "").with_endpoint(server.pushover_url());
    Ok(Arc::new(PushoverNotifier::new(&config)?))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn detects_change_and_notifies_pushover() -> Result<()> {
    init_tracing();
    let state = SiteState::new("<p>sold out</p>");
    let server = MockSiteServer::start(state.clone()).await?;

    let site = site_config(&server.page_url(), Duration::from_secs(1), Duration::ZERO)?;
    let mut worker = MonitorWorker::new(site, HttpChangeDetector::new()?, Some(pushover(&server)?))?;
    worker.start().await?;

    let messages = state.messages_titled(START_TITLE);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["message"], "Started monitoring mock shop");
    assert_eq!(messages[0]["url"], server.page_url());

    wait_until(Duration::from_secs(5), "first check", || worker.state().check_counter() >= 1).await?;
    assert!(state.messages_titled(CHANGE_TITLE).is_empty());

    state.set_page("<p>in stock</p>");
    wait_until(Duration::from_secs(5), "change notification", || {
        !state.messages_titled(CHANGE_TITLE).is_empty()
    })
    .await?;

    worker.stop().await?;
    assert_eq!(worker.status(), WorkerStatus::Stopped);

    let changes = state.messages_titled(CHANGE_TITLE);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["message"], "mock shop has changed");

    let sent_at_stop = state.messages().len();
    sleep(Duration::from_millis(1_500)).await;
    assert_eq!(state.messages().len(), sent_at_stop);

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn runner_stops_when_token_is_cancelled() -> Result<()> {
    init_tracing();
    let state = SiteState::new("steady");
    let server = MockSiteServer::start(state.clone()).await?;

    let site = site_config(&server.page_url(), Duration::from_secs(1), Duration::from_secs(2))?;
    let mut runner = Runner::new(site, HttpChangeDetector::new()?, Some(pushover(&server)?))?;
    let token = runner.cancellation_token();

    let canceller = tokio::spawn(async move {
        sleep(Duration::from_millis(2_500)).await;
        token.cancel();
    });

    timeout(Duration::from_secs(10), runner.run_until_signal()).await??;
    canceller.await?;

    assert_eq!(runner.worker().status(), WorkerStatus::Stopped);
    assert!(!runner.worker().is_active());
    assert_eq!(state.messages_titled(START_TITLE).len(), 1);
    assert_eq!(state.messages_titled("mock shop summary").len(), 1);
    assert!(state.page_hits() >= 2);

    server.shutdown().await;
    Ok(())
}
