//! Structured logging with a per-tick context

use uuid::Uuid;

use crate::pipeline::{FilterDecision, SaleCandidate};

/// Structured logger for one polling tick
#[derive(Debug, Clone)]
pub struct TickLogger {
    tick_id: String,
    tick: u64,
}

impl TickLogger {
    pub fn new(tick: u64) -> Self {
        Self {
            tick_id: Uuid::new_v4().to_string(),
            tick,
        }
    }

    pub fn log_batch(&self, count: usize, cursor: Option<&str>) {
        tracing::debug!(
            tick_id = %self.tick_id,
            tick = self.tick,
            count = count,
            cursor = ?cursor,
            "Fetched signature batch"
        );
    }

    pub fn log_filtered(&self, signature: &str, decision: FilterDecision) {
        tracing::debug!(
            tick_id = %self.tick_id,
            signature = %signature,
            reason = decision.as_str(),
            "Transaction filtered"
        );
    }

    pub fn log_not_marketplace(&self, signature: &str, program: &str) {
        tracing::info!(
            tick_id = %self.tick_id,
            signature = %signature,
            program = %program,
            "Not a supported marketplace sale"
        );
    }

    pub fn log_metadata_unavailable(&self, candidate: &SaleCandidate, error: &str) {
        tracing::warn!(
            tick_id = %self.tick_id,
            signature = %candidate.signature,
            date = %candidate.date,
            price_sol = candidate.price_sol,
            marketplace = %candidate.marketplace,
            mint = %candidate.mint,
            error = %error,
            "Couldn't get metadata, sale not forwarded"
        );
    }

    pub fn log_signature_error(&self, signature: &str, error: &str) {
        tracing::error!(
            tick_id = %self.tick_id,
            signature = %signature,
            error = %error,
            "Error while going through signatures"
        );
    }

    pub fn log_cursor_advanced(&self, from: Option<&str>, to: &str) {
        tracing::debug!(
            tick_id = %self.tick_id,
            from = ?from,
            to = %to,
            "Cursor advanced"
        );
    }
}
