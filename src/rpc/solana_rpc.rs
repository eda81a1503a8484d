//! `solana-client` backed implementation of [`ChainRpc`]

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_rpc_client_api::config::RpcTransactionConfig;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature};
use solana_transaction_status::{
    option_serializer::OptionSerializer, EncodedConfirmedTransactionWithStatusMeta,
    UiTransactionEncoding,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{ChainRpc, FetchError};
use crate::config::RpcConfig;
use crate::types::{TokenBalance, TransactionRecord};

/// Nonblocking JSON-RPC client for one endpoint
pub struct SolanaRpc {
    client: RpcClient,
    endpoint: String,
}

impl SolanaRpc {
    pub fn new(url: &str, commitment: CommitmentConfig, timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(url.to_string(), timeout, commitment),
            endpoint: url.to_string(),
        }
    }

    pub fn from_config(config: &RpcConfig) -> Self {
        Self::new(
            &config.url,
            parse_commitment(&config.commitment),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

/// Map a commitment name to its config, defaulting to confirmed
pub fn parse_commitment(name: &str) -> CommitmentConfig {
    match name {
        "processed" => CommitmentConfig::processed(),
        "finalized" => CommitmentConfig::finalized(),
        _ => CommitmentConfig::confirmed(),
    }
}

fn parse_signature(signature: &str) -> Result<Signature, FetchError> {
    Signature::from_str(signature).map_err(|_| FetchError::InvalidSignature(signature.to_string()))
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn signatures_for_address(
        &self,
        address: &Pubkey,
        until: Option<&str>,
    ) -> Result<Vec<String>, FetchError> {
        let config = GetConfirmedSignaturesForAddress2Config {
            before: None,
            until: until.map(parse_signature).transpose()?,
            limit: None,
            commitment: Some(self.client.commitment()),
        };

        let statuses = self
            .client
            .get_signatures_for_address_with_config(address, config)
            .await
            .map_err(|e| FetchError::from_client_error(e, &self.endpoint))?;

        debug!(count = statuses.len(), "Fetched signatures");
        Ok(statuses.into_iter().map(|s| s.signature).collect())
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn transaction(&self, signature: &str) -> Result<TransactionRecord, FetchError> {
        let sig = parse_signature(signature)?;
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Base64),
            commitment: Some(self.client.commitment()),
            max_supported_transaction_version: Some(0),
        };

        let encoded = self
            .client
            .get_transaction_with_config(&sig, config)
            .await
            .map_err(|e| {
                let err = FetchError::from_client_error(e, &self.endpoint);
                match err {
                    FetchError::RpcResponse { ref message, .. }
                        if message.to_lowercase().contains("invalid type: null") =>
                    {
                        FetchError::MissingTransaction(signature.to_string())
                    }
                    other => other,
                }
            })?;

        record_from_encoded(signature, encoded)
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>, FetchError> {
        self.client
            .get_account_data(address)
            .await
            .map_err(|e| FetchError::from_client_error(e, &self.endpoint))
    }
}

/// Convert the node's encoded transaction into a [`TransactionRecord`]
pub fn record_from_encoded(
    signature: &str,
    encoded: EncodedConfirmedTransactionWithStatusMeta,
) -> Result<TransactionRecord, FetchError> {
    let decode_err = |message: &str| FetchError::Decode {
        signature: signature.to_string(),
        message: message.to_string(),
    };

    let meta = encoded
        .transaction
        .meta
        .ok_or_else(|| decode_err("transaction meta missing"))?;
    let transaction = encoded
        .transaction
        .transaction
        .decode()
        .ok_or_else(|| decode_err("transaction payload could not be decoded"))?;

    let account_keys = transaction
        .message
        .static_account_keys()
        .iter()
        .map(|key| key.to_string())
        .collect();

    let post_token_balances = match meta.post_token_balances {
        OptionSerializer::Some(balances) => balances
            .into_iter()
            .map(|b| TokenBalance {
                account_index: b.account_index,
                mint: b.mint,
                owner: Option::<String>::from(b.owner),
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(TransactionRecord {
        signature: signature.to_string(),
        block_time: encoded.block_time,
        success: meta.err.is_none(),
        account_keys,
        pre_balances: meta.pre_balances,
        post_balances: meta.post_balances,
        post_token_balances,
    })
}
