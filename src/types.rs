//! Common types used throughout the sales bot

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Token balance entry recorded after a transaction executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    /// Index into the transaction's account keys
    pub account_index: u8,

    /// Mint address of the token held by the account
    pub mint: String,

    /// Owner of the token account, when the node reports it
    pub owner: Option<String>,
}

/// Decoded view of one confirmed transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction signature (base58)
    pub signature: String,

    /// Block time in Unix seconds, absent when the node has none for the slot
    pub block_time: Option<i64>,

    /// Execution outcome
    pub success: bool,

    /// Static account keys in message order
    pub account_keys: Vec<String>,

    /// Lamport balances before execution, indexed like `account_keys`
    pub pre_balances: Vec<u64>,

    /// Lamport balances after execution, indexed like `account_keys`
    pub post_balances: Vec<u64>,

    /// Token balances after execution
    pub post_token_balances: Vec<TokenBalance>,
}

impl TransactionRecord {
    /// Block time as a UTC timestamp
    pub fn block_date(&self) -> Option<DateTime<Utc>> {
        self.block_time
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}

/// Asset descriptor resolved from the on-chain record and its off-chain JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMetadata {
    /// Display name of the asset
    pub name: String,

    /// Image URL for previews
    pub image: Option<String>,

    /// URI the off-chain document was loaded from
    pub uri: String,
}

/// A classified marketplace sale, ready for notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleEvent {
    pub date: DateTime<Utc>,
    pub price_sol: f64,
    pub signature: String,
    pub mint: String,
    pub asset_name: String,
    pub marketplace: String,
    pub image_url: Option<String>,
}

impl SaleEvent {
    /// Human readable sale date
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }

    /// Price with the native coin suffix, e.g. `1.5 SOL`
    pub fn price_string(&self) -> String {
        format!("{} SOL", self.price_sol)
    }
}
