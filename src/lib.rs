pub mod detector;
pub mod notify;
pub mod runtime;
pub mod worker;

pub use detector::{ChangeDetector, FetchError, Fingerprint, HttpChangeDetector};
pub use notify::{Notifier, NotifyError, NotifyFuture, PushoverNotifier};
pub use runtime::config::{
    AppConfig, ConfigError, LogConfig, PushoverConfig, SiteConfig, SiteConfigBuilder,
};
pub use runtime::runner::Runner;
pub use runtime::telemetry::{init_tracing, Telemetry, TelemetrySnapshot};
pub use worker::{CheckState, MonitorWorker, WorkerError, WorkerStatus};
