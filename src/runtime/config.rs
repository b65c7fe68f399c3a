use crate::notify::pushover::PUSHOVER_MESSAGES_URL;
use crate::runtime::duration;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Shortest accepted check interval.
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(1);
/// Summary period used when the configured summary interval is 1s or less,
/// which leaves summaries effectively disabled.
pub const DISABLED_SUMMARY_PERIOD: Duration = Duration::from_secs(7 * 24 * 60 * 60);
/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "CONFIG_FILE";
pub const DEFAULT_CONFIG_PATH: &str = "/config.yml";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("{field} must start with http:// or https://, got {value:?}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("check interval {interval:?} is invalid, must be >= {minimum:?}")]
    IntervalTooShort {
        interval: Duration,
        minimum: Duration,
    },
    #[error("notifier passed to worker is missing")]
    MissingNotifier,
}

/// Identity and cadence of the monitored site.
///
/// Values built through [`SiteConfig::new`] or [`SiteConfig::builder`] are
/// validated immediately; values deserialized from YAML are validated when the
/// worker is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    name: String,
    url: String,
    #[serde(rename = "interval", deserialize_with = "duration::deserialize")]
    check_interval: Duration,
    #[serde(
        rename = "summary-interval",
        default,
        deserialize_with = "duration::deserialize"
    )]
    summary_interval: Duration,
}

impl SiteConfig {
    pub fn builder() -> SiteConfigBuilder {
        SiteConfigBuilder::default()
    }

    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        check_interval: Duration,
        summary_interval: Duration,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            name: trimmed_string(name.into()),
            url: trimmed_string(url.into()),
            check_interval,
            summary_interval,
        };
        config.validate()?;
        Ok(config)
    }

    /// Display name used in notification titles and messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Summary interval exactly as configured.
    pub fn summary_interval(&self) -> Duration {
        self.summary_interval
    }

    /// Period the summary timer actually runs at.
    pub fn summary_period(&self) -> Duration {
        if self.summary_interval > Duration::from_secs(1) {
            self.summary_interval
        } else {
            DISABLED_SUMMARY_PERIOD
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_interval < MIN_CHECK_INTERVAL {
            return Err(ConfigError::IntervalTooShort {
                interval: self.check_interval,
                minimum: MIN_CHECK_INTERVAL,
            });
        }
        ensure_not_empty(&self.url, "url")?;
        validate_url(&self.url, "url")?;
        ensure_not_empty(&self.name, "name")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct SiteConfigBuilder {
    name: Option<String>,
    url: Option<String>,
    check_interval: Option<Duration>,
    summary_interval: Option<Duration>,
}

impl SiteConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = Some(interval);
        self
    }

    pub fn summary_interval(mut self, interval: Duration) -> Self {
        self.summary_interval = Some(interval);
        self
    }

    pub fn build(self) -> Result<SiteConfig, ConfigError> {
        SiteConfig::new(
            self.name.ok_or(ConfigError::MissingField { field: "name" })?,
            self.url.ok_or(ConfigError::MissingField { field: "url" })?,
            self.check_interval.ok_or(ConfigError::MissingField {
                field: "check_interval",
            })?,
            self.summary_interval.unwrap_or_default(),
        )
    }
}

/// Credentials for the Pushover messages API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PushoverConfig {
    token: String,
    user: String,
    device: String,
    endpoint: String,
}

impl Default for PushoverConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            user: String::new(),
            device: String::new(),
            endpoint: PUSHOVER_MESSAGES_URL.to_owned(),
        }
    }
}

impl PushoverConfig {
    pub fn new(
        token: impl Into<String>,
        user: impl Into<String>,
        device: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            user: user.into(),
            device: device.into(),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_owned(),
        }
    }
}

impl LogConfig {
    /// Filter directive handed to the tracing subscriber when `RUST_LOG` is unset.
    pub fn level(&self) -> &str {
        &self.level
    }
}

/// Top-level layout of the YAML config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    site: SiteConfig,
    #[serde(default)]
    pushover: PushoverConfig,
    #[serde(default)]
    log: LogConfig,
}

impl AppConfig {
    /// Loads the file named by `CONFIG_FILE`, falling back to `/config.yml`.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        tracing::debug!(path = %path.display(), "loading config file");
        Self::from_path(&path)
    }

    pub fn config_path() -> PathBuf {
        env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("couldn't open config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("error parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("config must be a valid YAML document")
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub fn pushover(&self) -> &PushoverConfig {
        &self.pushover
    }

    pub fn log(&self) -> &LogConfig {
        &self.log
    }
}

fn trimmed_string(value: String) -> String {
    value.trim().to_owned()
}

fn ensure_not_empty(value: &str, field: &'static str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyField { field });
    }
    Ok(())
}

fn validate_url(url: &str, field: &'static str) -> Result<(), ConfigError> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl {
            field,
            value: url.to_owned(),
        });
    }
    Ok(())
}
