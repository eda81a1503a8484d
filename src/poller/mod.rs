//! Polling loop
//!
//! Each tick fetches the signatures newer than the cursor, walks them
//! oldest-to-newest through filter, classifier, metadata and notifier, then
//! moves the cursor to the newest signature of the batch. Signatures that fail
//! mid-way are skipped for good: delivery is at-most-once.

use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::metadata::{MetadataError, MetadataResolver};
use crate::metrics::metrics;
use crate::notifier::{DeliveryReport, Notifier};
use crate::pacing::idle;
use crate::pipeline::{admit, classify, Classification, ClassifyError, FilterDecision, MarketplaceRegistry, SaleCandidate};
use crate::rpc::{ChainRpc, FetchError};
use crate::structured_logging::TickLogger;
use crate::types::SaleEvent;

pub mod state;

pub use state::PollingState;

/// Failure while processing one signature; only that signature is skipped
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PerSignatureError {
    #[error("Failed to fetch transaction: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    MalformedSale(#[from] ClassifyError),
}

/// What happened to a signature that was processed without error
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureOutcome {
    Filtered(FilterDecision),
    NotAMarketplaceSale { program: String },
    MetadataUnavailable { candidate: SaleCandidate, error: MetadataError },
    Notified { sale: SaleEvent, delivery: DeliveryReport },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureResult {
    pub signature: String,
    pub outcome: Result<SignatureOutcome, PerSignatureError>,
}

/// Summary of one tick, in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub fetched: usize,
    pub results: Vec<SignatureResult>,
    /// Cursor after the tick
    pub cursor: Option<String>,
}

impl TickReport {
    /// No new signatures were found
    pub fn is_empty(&self) -> bool {
        self.fetched == 0
    }

    /// Sales notified this tick, oldest first
    pub fn sales(&self) -> impl Iterator<Item = &SaleEvent> {
        self.results.iter().filter_map(|r| match &r.outcome {
            Ok(SignatureOutcome::Notified { sale, .. }) => Some(sale),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &PerSignatureError)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().err().map(|e| (r.signature.as_str(), e)))
    }
}

/// Loop settings that do not belong to a collaborator
#[derive(Debug, Clone)]
pub struct PollerSettings {
    /// Admit transactions older than process start
    pub backfill: bool,
    /// Wait after an empty or failed fetch
    pub idle_interval: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            backfill: false,
            idle_interval: Duration::from_secs(2),
        }
    }
}

pub struct Poller {
    address: Pubkey,
    rpc: Arc<dyn ChainRpc>,
    metadata: Arc<dyn MetadataResolver>,
    notifier: Notifier,
    registry: MarketplaceRegistry,
    settings: PollerSettings,
}

impl Poller {
    pub fn new(
        address: Pubkey,
        rpc: Arc<dyn ChainRpc>,
        metadata: Arc<dyn MetadataResolver>,
        notifier: Notifier,
        registry: MarketplaceRegistry,
        settings: PollerSettings,
    ) -> Self {
        Self {
            address,
            rpc,
            metadata,
            notifier,
            registry,
            settings,
        }
    }

    pub fn address(&self) -> &Pubkey {
        &self.address
    }

    /// Run forever. Fetch failures and empty batches wait one idle interval
    /// before the next tick; nothing here terminates the loop.
    pub async fn run(&self, state: &mut PollingState) {
        info!(
            address = %self.address,
            marketplaces = self.registry.len(),
            backfill = self.settings.backfill,
            "Starting sales bot"
        );

        loop {
            match self.tick(state).await {
                Ok(report) if report.is_empty() => {
                    debug!(tick = report.tick, "No new signatures");
                    idle(self.settings.idle_interval).await;
                }
                Ok(report) => {
                    debug!(
                        tick = report.tick,
                        fetched = report.fetched,
                        sales = report.sales().count(),
                        errors = report.errors().count(),
                        "Tick complete"
                    );
                }
                Err(e) => {
                    error!(error = %e, retryable = e.is_retryable(), "Error fetching signatures");
                    idle(self.settings.idle_interval).await;
                }
            }
        }
    }

    /// One polling tick. A fetch failure leaves the cursor untouched; otherwise
    /// the cursor ends on the newest fetched signature whatever happened to
    /// the individual signatures.
    pub async fn tick(&self, state: &mut PollingState) -> Result<TickReport, FetchError> {
        let tick = state.begin_tick();
        let logger = TickLogger::new(tick);
        let started = Instant::now();
        metrics().ticks_total.inc();

        let signatures = match self
            .rpc
            .signatures_for_address(&self.address, state.cursor())
            .await
        {
            Ok(signatures) => signatures,
            Err(e) => {
                metrics().fetch_errors.inc();
                return Err(e);
            }
        };

        logger.log_batch(signatures.len(), state.cursor());
        metrics().last_batch_size.set(signatures.len() as i64);

        let mut report = TickReport {
            tick,
            fetched: signatures.len(),
            results: Vec::with_capacity(signatures.len()),
            cursor: state.cursor().map(str::to_string),
        };

        let Some(newest) = signatures.first() else {
            metrics().tick_duration.observe(started.elapsed().as_secs_f64());
            return Ok(report);
        };

        // The feed is newest-first
        for signature in signatures.iter().rev() {
            metrics().signatures_processed.inc();
            let outcome = self.process_signature(signature, state, &logger).await;
            if let Err(e) = &outcome {
                metrics().signatures_failed.inc();
                logger.log_signature_error(signature, &e.to_string());
            }
            report.results.push(SignatureResult {
                signature: signature.clone(),
                outcome,
            });
        }

        let previous = state.cursor().map(str::to_string);
        state.advance(newest);
        logger.log_cursor_advanced(previous.as_deref(), newest);
        report.cursor = state.cursor().map(str::to_string);

        metrics().tick_duration.observe(started.elapsed().as_secs_f64());
        Ok(report)
    }

    async fn process_signature(
        &self,
        signature: &str,
        state: &PollingState,
        logger: &TickLogger,
    ) -> Result<SignatureOutcome, PerSignatureError> {
        let record = self.rpc.transaction(signature).await?;

        let decision = admit(&record, state.process_start(), self.settings.backfill);
        if !decision.is_admitted() {
            metrics().transactions_filtered.inc();
            logger.log_filtered(signature, decision);
            return Ok(SignatureOutcome::Filtered(decision));
        }

        let candidate = match classify(&record, &self.registry)? {
            Classification::Sale(candidate) => candidate,
            Classification::NotAMarketplaceSale { program } => {
                metrics().non_marketplace_transactions.inc();
                logger.log_not_marketplace(signature, &program);
                return Ok(SignatureOutcome::NotAMarketplaceSale { program });
            }
        };
        metrics().sales_detected.inc();

        let metadata = match self.metadata.resolve(&candidate.mint).await {
            Ok(metadata) => metadata,
            Err(error) => {
                metrics().metadata_unavailable.inc();
                logger.log_metadata_unavailable(&candidate, &error.to_string());
                return Ok(SignatureOutcome::MetadataUnavailable { candidate, error });
            }
        };

        let sale = SaleEvent {
            date: candidate.date,
            price_sol: candidate.price_sol,
            signature: candidate.signature,
            mint: candidate.mint,
            asset_name: metadata.name,
            marketplace: candidate.marketplace,
            image_url: metadata.image,
        };

        let delivery = self.notifier.notify(&sale).await;
        Ok(SignatureOutcome::Notified { sale, delivery })
    }
}
