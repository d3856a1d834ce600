//! Where catalog snapshots come from.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::CatalogError;
use crate::retry::retry_with_backoff;

/// A source of raw catalog CSV bytes for the current snapshot.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Returns the full CSV body of the current catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the snapshot cannot be retrieved.
    async fn fetch_catalog_csv(&self) -> Result<Vec<u8>, CatalogError>;
}

/// HTTP client for the catalog feed.
///
/// A 404 surfaces as [`CatalogError::NotFound`], a 429 as
/// [`CatalogError::RateLimited`], and any other non-2xx status as
/// [`CatalogError::UnexpectedStatus`]. Network failures, 429 and 5xx are
/// retried with exponential back-off up to `max_retries` additional attempts.
pub struct FeedClient {
    client: Client,
    url: String,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay for exponential back-off: `backoff_base_ms * 2^attempt`.
    backoff_base_ms: u64,
}

impl FeedClient {
    /// Creates a `FeedClient` for `url` with the given timeout, `User-Agent`,
    /// and retry policy. Set `max_retries` to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        url: impl Into<String>,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from the feed settings in `config`.
    ///
    /// # Errors
    ///
    /// See [`FeedClient::new`].
    pub fn from_app_config(config: &drange_core::AppConfig) -> Result<Self, CatalogError> {
        Self::new(
            config.catalog_feed_url.clone(),
            config.feed_request_timeout_secs,
            &config.feed_user_agent,
            config.feed_max_retries,
            config.feed_retry_backoff_base_ms,
        )
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_once(&self) -> Result<Vec<u8>, CatalogError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(CatalogError::RateLimited { retry_after_secs });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                url: self.url.clone(),
            });
        }

        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl CatalogSource for FeedClient {
    async fn fetch_catalog_csv(&self) -> Result<Vec<u8>, CatalogError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_once()
        })
        .await
        .inspect_err(|e| tracing::error!(url = %self.url, error = %e, "catalog feed fetch failed"))?;

        tracing::info!(url = %self.url, bytes = body.len(), "catalog feed fetched");
        Ok(body)
    }
}

/// A fixed, in-memory catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    body: Vec<u8>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_catalog_csv(&self) -> Result<Vec<u8>, CatalogError> {
        Ok(self.body.clone())
    }
}
