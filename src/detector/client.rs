//! Content fetching for change detection: the `ChangeDetector` trait consumed
//! by the monitor worker, its error type, and the reqwest-backed
//! `HttpChangeDetector`.

use crate::detector::fingerprint::Fingerprint;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::Client;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Failure reported by a detector that does not go through reqwest.
    #[error("fetch from {url} failed: {reason}")]
    Other { url: String, reason: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. }
            | FetchError::Body { url, .. }
            | FetchError::Other { url, .. } => url,
        }
    }
}

/// Produces a fingerprint for whatever is currently served at a URL.
///
/// Implementations are stateless: every call performs a fresh fetch.
pub trait ChangeDetector: Send + Sync + 'static {
    fn fetch_fingerprint<'a>(&'a self, url: &'a str)
        -> BoxFuture<'a, Result<Fingerprint, FetchError>>;
}

/// Fetches pages with a single GET using the reqwest client defaults for
/// redirects and timeouts.
#[derive(Debug, Clone)]
pub struct HttpChangeDetector {
    client: Client,
}

impl ChangeDetector for HttpChangeDetector {
    fn fetch_fingerprint<'a>(
        &'a self,
        url: &'a str,
    ) -> BoxFuture<'a, Result<Fingerprint, FetchError>> {
        Box::pin(self.fetch(url))
    }
}

impl HttpChangeDetector {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &str) -> Result<Fingerprint, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|source| FetchError::Body {
            url: url.to_owned(),
            source,
        })?;

        let fingerprint = Fingerprint::from_bytes(&body);
        tracing::debug!(
            url,
            status = status.as_u16(),
            bytes = body.len(),
            fingerprint = %fingerprint,
            "fetched page"
        );
        Ok(fingerprint)
    }
}
