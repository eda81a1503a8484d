//! Chain RPC Module
//!
//! The poller and the metadata resolver talk to the chain only through
//! [`ChainRpc`], so ticks can be exercised against in-memory fakes.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::metrics;
use crate::pacing::RequestPacer;
use crate::types::TransactionRecord;

// Submodules
pub mod rpc_errors;
pub mod solana_rpc;

// Re-exports for convenience
pub use rpc_errors::FetchError;
pub use solana_rpc::SolanaRpc;

/// Upstream chain collaborator
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Signatures touching `address`, newest-first, strictly newer than `until`
    async fn signatures_for_address(
        &self,
        address: &Pubkey,
        until: Option<&str>,
    ) -> Result<Vec<String>, FetchError>;

    /// Confirmed transaction for a signature
    async fn transaction(&self, signature: &str) -> Result<TransactionRecord, FetchError>;

    /// Raw data of an account
    async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>, FetchError>;
}

/// Awaits the shared pacer before delegating every call
pub struct PacedRpc<R> {
    inner: R,
    pacer: Arc<RequestPacer>,
}

impl<R: ChainRpc> PacedRpc<R> {
    pub fn new(inner: R, pacer: Arc<RequestPacer>) -> Self {
        Self { inner, pacer }
    }
}

#[async_trait]
impl<R: ChainRpc> ChainRpc for PacedRpc<R> {
    async fn signatures_for_address(
        &self,
        address: &Pubkey,
        until: Option<&str>,
    ) -> Result<Vec<String>, FetchError> {
        self.pacer.ready().await;
        let started = Instant::now();
        let result = self.inner.signatures_for_address(address, until).await;
        metrics().rpc_latency.observe(started.elapsed().as_secs_f64());
        result
    }

    async fn transaction(&self, signature: &str) -> Result<TransactionRecord, FetchError> {
        self.pacer.ready().await;
        let started = Instant::now();
        let result = self.inner.transaction(signature).await;
        metrics().rpc_latency.observe(started.elapsed().as_secs_f64());
        result
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>, FetchError> {
        self.pacer.ready().await;
        let started = Instant::now();
        let result = self.inner.account_data(address).await;
        metrics().rpc_latency.observe(started.elapsed().as_secs_f64());
        result
    }
}

#[async_trait]
impl<T: ChainRpc + ?Sized> ChainRpc for Arc<T> {
    async fn signatures_for_address(
        &self,
        address: &Pubkey,
        until: Option<&str>,
    ) -> Result<Vec<String>, FetchError> {
        (**self).signatures_for_address(address, until).await
    }

    async fn transaction(&self, signature: &str) -> Result<TransactionRecord, FetchError> {
        (**self).transaction(signature).await
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>, FetchError> {
        (**self).account_data(address).await
    }
}
