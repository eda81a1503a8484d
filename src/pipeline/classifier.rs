//! Marketplace sale classification
//!
//! The program address is taken from the last account key and the price from
//! the fee payer's (index 0) lamport delta. This matches the layout observed
//! in the registered marketplaces' sale transactions and is a heuristic, not a
//! general transaction-value parser. Suspicious results are logged at warn.

use chrono::{DateTime, Utc};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use tracing::{debug, warn};

use super::errors::ClassifyError;
use super::registry::MarketplaceRegistry;
use crate::types::TransactionRecord;

/// A marketplace sale before metadata resolution
#[derive(Debug, Clone, PartialEq)]
pub struct SaleCandidate {
    pub signature: String,
    pub date: DateTime<Utc>,
    pub price_sol: f64,
    pub mint: String,
    pub marketplace: String,
    pub program: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Sale(SaleCandidate),
    NotAMarketplaceSale { program: String },
}

/// Convert a lamport delta into whole coins
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Absolute index-0 balance change, in whole coins
pub fn price_from_balances(pre_balances: &[u64], post_balances: &[u64]) -> Option<f64> {
    let pre = *pre_balances.first()?;
    let post = *post_balances.first()?;
    Some(lamports_to_sol(pre.abs_diff(post)))
}

/// Classify a filtered transaction
pub fn classify(
    record: &TransactionRecord,
    registry: &MarketplaceRegistry,
) -> Result<Classification, ClassifyError> {
    let program = record
        .account_keys
        .last()
        .ok_or_else(|| ClassifyError::NoAccounts {
            signature: record.signature.clone(),
        })?;

    let Some(marketplace) = registry.lookup(program) else {
        debug!(signature = %record.signature, program = %program, "Not a supported marketplace sale");
        return Ok(Classification::NotAMarketplaceSale {
            program: program.clone(),
        });
    };

    let price_sol = price_from_balances(&record.pre_balances, &record.post_balances).ok_or_else(|| {
        ClassifyError::MissingBalances {
            signature: record.signature.clone(),
        }
    })?;

    let mint = record
        .post_token_balances
        .first()
        .map(|balance| balance.mint.clone())
        .ok_or_else(|| ClassifyError::NoTokenBalances {
            signature: record.signature.clone(),
        })?;

    let date = record.block_date().ok_or_else(|| ClassifyError::MissingBlockTime {
        signature: record.signature.clone(),
    })?;

    if price_sol == 0.0 {
        warn!(
            signature = %record.signature,
            marketplace = %marketplace,
            "Fee payer balance unchanged, price heuristic may not fit this transaction shape"
        );
    }

    Ok(Classification::Sale(SaleCandidate {
        signature: record.signature.clone(),
        date,
        price_sol,
        mint,
        marketplace: marketplace.to_string(),
        program: program.clone(),
    }))
}
