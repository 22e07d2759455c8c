//! RapidAPI stock data client.
//!
//! One GET per call against the configured modules endpoint. The response
//! body is handed back as an untyped JSON tree; nothing is filtered.

use reqwest::Url;
use tracing::{debug, instrument, warn};

use crate::core::config::{CredentialsConfig, UpstreamConfig};
use crate::domains::tools::error::UpstreamError;

/// Anything that can produce stock data for a ticker.
#[async_trait::async_trait]
pub trait StockDataSource: Send + Sync {
    /// Fetch the upstream payload for `ticker`.
    async fn fetch_stock(&self, ticker: &str) -> Result<serde_json::Value, UpstreamError>;
}

/// HTTP client for the Yahoo Finance modules endpoint on RapidAPI.
pub struct StockApiClient {
    http: reqwest::Client,
    base_url: String,
    host: String,
    module: String,
    api_key: String,
}

impl StockApiClient {
    /// Create a client from the upstream endpoint and credentials.
    ///
    /// The key is captured once here; a missing key is sent as `""`.
    pub fn new(
        upstream: &UpstreamConfig,
        credentials: &CredentialsConfig,
    ) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: upstream.base_url.clone(),
            host: upstream.host.clone(),
            module: upstream.module.clone(),
            api_key: credentials.rapidapi_key_or_empty().to_string(),
        })
    }

    /// Replace the underlying reqwest client (e.g. for testing with `no_proxy()`).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Build the request URL for `ticker`.
    pub fn request_url(&self, ticker: &str) -> Result<Url, UpstreamError> {
        Url::parse_with_params(
            &self.base_url,
            &[("ticker", ticker), ("module", self.module.as_str())],
        )
        .map_err(|e| UpstreamError::request(format!("Invalid API endpoint: {e}")))
    }
}

#[async_trait::async_trait]
impl StockDataSource for StockApiClient {
    #[instrument(skip(self))]
    async fn fetch_stock(&self, ticker: &str) -> Result<serde_json::Value, UpstreamError> {
        let url = self.request_url(ticker)?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Stock API answered {} for {}", status, ticker);
            return Err(UpstreamError::Status(status.as_u16()));
        }

        Ok(response.json::<serde_json::Value>().await?)
    }
}
