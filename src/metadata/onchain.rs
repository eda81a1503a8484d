//! Metaplex token-metadata account derivation and decoding

use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;

use super::MetadataError;

/// Metaplex token-metadata program
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

const METADATA_SEED: &[u8] = b"metadata";

/// Derive the metadata account address for a mint
pub fn metadata_pda(mint: &Pubkey) -> Pubkey {
    let (pda, _bump) = Pubkey::find_program_address(
        &[METADATA_SEED, TOKEN_METADATA_PROGRAM_ID.as_ref(), mint.as_ref()],
        &TOKEN_METADATA_PROGRAM_ID,
    );
    pda
}

/// Leading fields of a metadata account; the remainder is ignored
#[derive(Debug, BorshDeserialize)]
struct MetadataPrefix {
    _key: u8,
    _update_authority: [u8; 32],
    mint: [u8; 32],
    name: String,
    symbol: String,
    uri: String,
}

/// Decoded subset of the on-chain record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainMetadata {
    pub mint: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

/// Decode a metadata account. Names are stored NUL padded to fixed widths.
pub fn decode_onchain_metadata(data: &[u8]) -> Result<OnChainMetadata, MetadataError> {
    let mut slice = data;
    let prefix = MetadataPrefix::deserialize(&mut slice)
        .map_err(|e| MetadataError::Decode(e.to_string()))?;

    let uri = trim_padding(&prefix.uri);
    if uri.is_empty() {
        return Err(MetadataError::Decode("metadata record has an empty uri".to_string()));
    }

    Ok(OnChainMetadata {
        mint: Pubkey::new_from_array(prefix.mint),
        name: trim_padding(&prefix.name),
        symbol: trim_padding(&prefix.symbol),
        uri,
    })
}

fn trim_padding(value: &str) -> String {
    value.trim_end_matches('\0').trim().to_string()
}
