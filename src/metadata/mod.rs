//! NFT metadata resolution
//!
//! Two steps: the mint's metadata account is derived and loaded from chain,
//! then the URI it embeds is fetched over HTTP. Any failure means the
//! metadata is unavailable for that sale.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::rpc::{ChainRpc, FetchError};
use crate::types::NftMetadata;

pub mod offchain;
pub mod onchain;

pub use offchain::{OffChainFetcher, OffChainMetadata};
pub use onchain::{decode_onchain_metadata, metadata_pda, OnChainMetadata, TOKEN_METADATA_PROGRAM_ID};

/// Reasons metadata could not be resolved
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Invalid mint address: {0}")]
    InvalidMint(String),

    #[error("Metadata account fetch failed: {0}")]
    Rpc(#[from] FetchError),

    #[error("Metadata account decode failed: {0}")]
    Decode(String),

    #[error("Metadata request failed: {0}")]
    Http(String),

    #[error("Metadata host returned status {0}")]
    Status(u16),

    #[error("Metadata document is not valid JSON: {0}")]
    Json(String),
}

impl MetadataError {
    /// Worth another attempt within the same resolution
    pub fn is_transient(&self) -> bool {
        match self {
            MetadataError::Http(_) => true,
            MetadataError::Status(code) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

/// Resolves display metadata for a mint
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, mint: &str) -> Result<NftMetadata, MetadataError>;
}

/// Metaplex on-chain record followed by its off-chain JSON document
pub struct MetaplexResolver<R> {
    rpc: R,
    fetcher: OffChainFetcher,
}

impl<R: ChainRpc> MetaplexResolver<R> {
    pub fn new(rpc: R, fetcher: OffChainFetcher) -> Self {
        Self { rpc, fetcher }
    }
}

#[async_trait]
impl<R: ChainRpc> MetadataResolver for MetaplexResolver<R> {
    #[instrument(skip(self))]
    async fn resolve(&self, mint: &str) -> Result<NftMetadata, MetadataError> {
        let mint_key = Pubkey::from_str(mint).map_err(|_| MetadataError::InvalidMint(mint.to_string()))?;
        let account = metadata_pda(&mint_key);

        let data = self.rpc.account_data(&account).await?;
        let onchain = decode_onchain_metadata(&data)?;
        debug!(account = %account, uri = %onchain.uri, "Loaded on-chain metadata");

        let document = self.fetcher.fetch(&onchain.uri).await?;

        let name = document
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(onchain.name);

        Ok(NftMetadata {
            name,
            image: document.image.filter(|i| !i.trim().is_empty()),
            uri: onchain.uri,
        })
    }
}
