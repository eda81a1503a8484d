//! Shared fakes for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sales_bot::metadata::{MetadataError, MetadataResolver};
use sales_bot::notifier::{Notifier, NotifyError, SaleSink};
use sales_bot::pipeline::MarketplaceRegistry;
use sales_bot::poller::{Poller, PollerSettings};
use sales_bot::rpc::{ChainRpc, FetchError};
use sales_bot::types::{NftMetadata, SaleEvent, TokenBalance, TransactionRecord};

pub const START: i64 = 1_700_000_000;
pub const MAGIC_EDEN: &str = "MEisE1HzehtrDpAAT8PnLHjpSSkRYakotTuJRPjTpo8";
pub const SOLANART: &str = "CJsLwbP1iu5DuUikHEJnLfANgKy6stB2uFgvBBHoyxwz";
pub const LAMPORTS: u64 = 1_000_000_000;

pub fn start() -> DateTime<Utc> {
    Utc.timestamp_opt(START, 0).unwrap()
}

pub fn watched() -> Pubkey {
    Pubkey::new_from_array([9u8; 32])
}

/// In-memory chain: scripted signature batches, transactions and accounts
#[derive(Default)]
pub struct FakeRpc {
    batches: Mutex<VecDeque<Result<Vec<String>, FetchError>>>,
    transactions: Mutex<HashMap<String, Result<TransactionRecord, FetchError>>>,
    accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    until_calls: Mutex<Vec<Option<String>>>,
    fetch_times: Mutex<Vec<tokio::time::Instant>>,
    transaction_calls: Mutex<Vec<String>>,
}

impl FakeRpc {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue one fetch result, newest-first like the real feed
    pub fn push_batch(&self, signatures: &[&str]) {
        self.batches
            .lock()
            .unwrap()
            .push_back(Ok(signatures.iter().map(|s| s.to_string()).collect()));
    }

    pub fn push_fetch_error(&self) {
        self.batches.lock().unwrap().push_back(Err(FetchError::Transport {
            endpoint: "fake".to_string(),
            message: "connection reset".to_string(),
        }));
    }

    pub fn add_transaction(&self, record: TransactionRecord) {
        self.transactions
            .lock()
            .unwrap()
            .insert(record.signature.clone(), Ok(record));
    }

    pub fn add_transaction_error(&self, signature: &str) {
        self.transactions.lock().unwrap().insert(
            signature.to_string(),
            Err(FetchError::Timeout {
                endpoint: "fake".to_string(),
            }),
        );
    }

    pub fn add_account(&self, address: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(address, data);
    }

    pub fn until_calls(&self) -> Vec<Option<String>> {
        self.until_calls.lock().unwrap().clone()
    }

    /// When each signature fetch happened, on the tokio clock
    pub fn fetch_times(&self) -> Vec<tokio::time::Instant> {
        self.fetch_times.lock().unwrap().clone()
    }

    pub fn transaction_calls(&self) -> Vec<String> {
        self.transaction_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainRpc for FakeRpc {
    async fn signatures_for_address(
        &self,
        _address: &Pubkey,
        until: Option<&str>,
    ) -> Result<Vec<String>, FetchError> {
        self.until_calls.lock().unwrap().push(until.map(str::to_string));
        self.fetch_times.lock().unwrap().push(tokio::time::Instant::now());
        self.batches.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn transaction(&self, signature: &str) -> Result<TransactionRecord, FetchError> {
        self.transaction_calls.lock().unwrap().push(signature.to_string());
        self.transactions
            .lock()
            .unwrap()
            .get(signature)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::MissingTransaction(signature.to_string())))
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>, FetchError> {
        self.accounts
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| FetchError::RpcResponse {
                endpoint: "fake".to_string(),
                message: format!("AccountNotFound: {}", address),
                code: None,
            })
    }
}

/// Metadata keyed by mint; unknown mints are unavailable
#[derive(Default)]
pub struct FakeResolver {
    known: HashMap<String, NftMetadata>,
}

impl FakeResolver {
    pub fn with(mut self, mint: &str, name: &str, image: &str) -> Self {
        self.known.insert(
            mint.to_string(),
            NftMetadata {
                name: name.to_string(),
                image: Some(image.to_string()),
                uri: format!("https://arweave.net/{}", mint),
            },
        );
        self
    }
}

#[async_trait]
impl MetadataResolver for FakeResolver {
    async fn resolve(&self, mint: &str) -> Result<NftMetadata, MetadataError> {
        self.known
            .get(mint)
            .cloned()
            .ok_or(MetadataError::Status(404))
    }
}

/// Captures delivered sales in order
#[derive(Default)]
pub struct RecordingSink {
    sales: Mutex<Vec<SaleEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sales(&self) -> Vec<SaleEvent> {
        self.sales.lock().unwrap().clone()
    }

    pub fn signatures(&self) -> Vec<String> {
        self.sales().into_iter().map(|s| s.signature).collect()
    }
}

#[async_trait]
impl SaleSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, sale: &SaleEvent) -> Result<(), NotifyError> {
        self.sales.lock().unwrap().push(sale.clone());
        Ok(())
    }
}

/// A successful marketplace sale of `mint` for `price_sol` whole coins
pub fn sale_record(signature: &str, offset_secs: i64, program: &str, mint: &str, price_sol: u64) -> TransactionRecord {
    TransactionRecord {
        signature: signature.to_string(),
        block_time: Some(START + offset_secs),
        success: true,
        account_keys: vec![
            "Buyer1111111111111111111111111111111111111".to_string(),
            "Seller111111111111111111111111111111111111".to_string(),
            program.to_string(),
        ],
        pre_balances: vec![10 * LAMPORTS, 0, 1],
        post_balances: vec![(10 - price_sol) * LAMPORTS, 0, 1],
        post_token_balances: vec![TokenBalance {
            account_index: 1,
            mint: mint.to_string(),
            owner: None,
        }],
    }
}

pub fn poller_with(
    rpc: Arc<FakeRpc>,
    resolver: FakeResolver,
    sink: Arc<RecordingSink>,
    backfill: bool,
) -> Poller {
    poller_on(
        rpc,
        resolver,
        sink,
        PollerSettings {
            backfill,
            idle_interval: Duration::from_millis(5),
        },
    )
}

/// Poller over any chain collaborator, e.g. a paced fake
pub fn poller_on(
    rpc: Arc<dyn ChainRpc>,
    resolver: FakeResolver,
    sink: Arc<RecordingSink>,
    settings: PollerSettings,
) -> Poller {
    Poller::new(
        watched(),
        rpc,
        Arc::new(resolver),
        Notifier::new(vec![sink as Arc<dyn SaleSink>]),
        MarketplaceRegistry::default(),
        settings,
    )
}
