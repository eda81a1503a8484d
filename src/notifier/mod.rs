//! Sale notification sinks
//!
//! Every sale is handed to each configured sink. A sink failing never stops
//! the others or the polling loop; failures are logged and reported back.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::NotifierConfig;
use crate::metrics::metrics;
use crate::pacing::RequestPacer;
use crate::types::SaleEvent;

pub mod embed;

pub use embed::{explorer_link, Embed, EmbedField, EmbedImage, WebhookPayload};

/// Delivery failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Transport(String),

    #[error("Webhook rejected the payload with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Destination for formatted sale records
#[async_trait]
pub trait SaleSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, sale: &SaleEvent) -> Result<(), NotifyError>;
}

/// Writes the sale to the log
pub struct ConsoleSink {
    explorer_template: String,
}

impl ConsoleSink {
    pub fn new(explorer_template: &str) -> Self {
        Self {
            explorer_template: explorer_template.to_string(),
        }
    }
}

#[async_trait]
impl SaleSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, sale: &SaleEvent) -> Result<(), NotifyError> {
        info!(
            date = %sale.date_string(),
            price = %sale.price_string(),
            signature = %sale.signature,
            name = %sale.asset_name,
            image = %sale.image_url.as_deref().unwrap_or("-"),
            marketplace = %sale.marketplace,
            explorer = %explorer_link(&self.explorer_template, &sale.signature),
            "Sale at {} ---> {}",
            sale.date_string(),
            sale.price_string()
        );
        Ok(())
    }
}

/// Posts the rich-embed payload to the webhook
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
    explorer_template: String,
    pacer: Arc<RequestPacer>,
}

impl WebhookSink {
    pub fn new(client: reqwest::Client, url: &str, explorer_template: &str, pacer: Arc<RequestPacer>) -> Self {
        Self {
            client,
            url: url.to_string(),
            explorer_template: explorer_template.to_string(),
            pacer,
        }
    }
}

#[async_trait]
impl SaleSink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, sale: &SaleEvent) -> Result<(), NotifyError> {
        let payload = WebhookPayload::for_sale(sale, &self.explorer_template);

        self.pacer.ready().await;
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Outcome of handing one sale to every sink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<&'static str>,
    pub failed: Vec<(&'static str, NotifyError)>,
}

impl DeliveryReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fans a sale out to the configured sinks, in order
pub struct Notifier {
    sinks: Vec<Arc<dyn SaleSink>>,
}

impl Notifier {
    pub fn new(sinks: Vec<Arc<dyn SaleSink>>) -> Self {
        Self { sinks }
    }

    /// Console sink when enabled, webhook sink only when explicitly enabled
    pub fn from_config(
        config: &NotifierConfig,
        webhook_url: &str,
        pacer: Arc<RequestPacer>,
    ) -> Result<Self, NotifyError> {
        let mut sinks: Vec<Arc<dyn SaleSink>> = Vec::new();

        if config.console {
            sinks.push(Arc::new(ConsoleSink::new(&config.explorer_url_template)));
        }

        if config.webhook_enabled {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.http_timeout_secs))
                .build()
                .map_err(|e| NotifyError::Transport(e.to_string()))?;
            sinks.push(Arc::new(WebhookSink::new(
                client,
                webhook_url,
                &config.explorer_url_template,
                pacer,
            )));
        } else {
            info!("Webhook delivery disabled, sales are logged only");
        }

        Ok(Self::new(sinks))
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub async fn notify(&self, sale: &SaleEvent) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for sink in &self.sinks {
            match sink.deliver(sale).await {
                Ok(()) => {
                    metrics().notifications_delivered.inc();
                    report.delivered.push(sink.name());
                }
                Err(e) => {
                    metrics().notification_failures.inc();
                    warn!(
                        sink = sink.name(),
                        signature = %sale.signature,
                        date = %sale.date_string(),
                        error = %e,
                        "Failed to deliver sale notification"
                    );
                    report.failed.push((sink.name(), e));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    struct FailingSink;

    #[async_trait]
    impl SaleSink for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn deliver(&self, _sale: &SaleEvent) -> Result<(), NotifyError> {
            Err(NotifyError::Transport("connection refused".to_string()))
        }
    }

    fn sale() -> SaleEvent {
        SaleEvent {
            date: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            price_sol: 1.0,
            signature: "sig".to_string(),
            mint: "mint".to_string(),
            asset_name: "Ape".to_string(),
            marketplace: "Magic Eden".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn test_webhook_disabled_by_default() {
        let notifier = Notifier::from_config(
            &NotifierConfig::default(),
            "https://example.com/hook",
            Arc::new(RequestPacer::unlimited()),
        )
        .unwrap();
        assert_eq!(notifier.sink_names(), vec!["console"]);
    }

    #[test]
    fn test_webhook_enabled_by_flag() {
        let config = NotifierConfig {
            webhook_enabled: true,
            ..NotifierConfig::default()
        };
        let notifier = Notifier::from_config(
            &config,
            "https://example.com/hook",
            Arc::new(RequestPacer::unlimited()),
        )
        .unwrap();
        assert_eq!(notifier.sink_names(), vec!["console", "webhook"]);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_other_sinks() {
        let notifier = Notifier::new(vec![
            Arc::new(FailingSink),
            Arc::new(ConsoleSink::new("https://x/{signature}")),
        ]);

        let report = notifier.notify(&sale()).await;
        assert_eq!(report.delivered, vec!["console"]);
        assert_eq!(report.failed.len(), 1);
        assert!(!report.all_delivered());
    }
}
