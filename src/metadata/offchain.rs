//! Off-chain metadata document fetch

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::RetryIf;
use tracing::debug;

use super::MetadataError;
use crate::config::MetadataConfig;
use crate::pacing::RequestPacer;

/// Fields of the off-chain JSON document the bot uses; the rest is ignored
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OffChainMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Plain HTTP GET of metadata documents with bounded retries
#[derive(Debug, Clone)]
pub struct OffChainFetcher {
    client: reqwest::Client,
    pacer: Arc<RequestPacer>,
    max_retries: usize,
    retry_delay: Duration,
}

impl OffChainFetcher {
    pub fn new(
        client: reqwest::Client,
        pacer: Arc<RequestPacer>,
        max_retries: usize,
        retry_delay: Duration,
    ) -> Self {
        Self {
            client,
            pacer,
            max_retries,
            retry_delay,
        }
    }

    pub fn from_config(config: &MetadataConfig, pacer: Arc<RequestPacer>) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| MetadataError::Http(e.to_string()))?;
        Ok(Self::new(
            client,
            pacer,
            config.max_retries,
            Duration::from_millis(config.retry_delay_ms),
        ))
    }

    /// Fetch and parse the document at `uri`, retrying transient failures
    pub async fn fetch(&self, uri: &str) -> Result<OffChainMetadata, MetadataError> {
        let strategy = FixedInterval::new(self.retry_delay).take(self.max_retries);
        RetryIf::spawn(strategy, || self.fetch_once(uri), MetadataError::is_transient).await
    }

    async fn fetch_once(&self, uri: &str) -> Result<OffChainMetadata, MetadataError> {
        self.pacer.ready().await;
        debug!(uri = %uri, "Fetching off-chain metadata");

        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| MetadataError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status.as_u16()));
        }

        response
            .json::<OffChainMetadata>()
            .await
            .map_err(|e| MetadataError::Json(e.to_string()))
    }
}
