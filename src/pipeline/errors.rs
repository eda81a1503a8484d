//! Error types for the classification pipeline

use thiserror::Error;

/// A transaction matched a marketplace but its shape cannot yield a sale
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Malformed sale {signature}: no account keys")]
    NoAccounts { signature: String },

    #[error("Malformed sale {signature}: missing fee payer balance")]
    MissingBalances { signature: String },

    #[error("Malformed sale {signature}: no post-transaction token balances")]
    NoTokenBalances { signature: String },

    #[error("Malformed sale {signature}: missing block time")]
    MissingBlockTime { signature: String },
}

impl ClassifyError {
    pub fn signature(&self) -> &str {
        match self {
            Self::NoAccounts { signature }
            | Self::MissingBalances { signature }
            | Self::NoTokenBalances { signature }
            | Self::MissingBlockTime { signature } => signature,
        }
    }
}
