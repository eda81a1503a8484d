//! NFT Marketplace Sales Bot Library
//!
//! Polls a Solana address for new transactions, classifies the ones that are
//! marketplace sales, resolves the sold asset's metadata and notifies.

pub mod config;
pub mod endpoints;
pub mod metadata;
pub mod metrics;
pub mod notifier;
pub mod pacing;
pub mod pipeline;
pub mod poller;
pub mod rpc;
pub mod structured_logging;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use poller::{PerSignatureError, Poller, PollerSettings, PollingState, SignatureOutcome, TickReport};
pub use types::{NftMetadata, SaleEvent, TransactionRecord};
