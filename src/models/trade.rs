use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;

/// A token movement observed by the chain-data provider.
///
/// `token_contract` is `None` for the chain's native asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub transaction_hash: B256,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub from_address: Address,
    pub to_address: Address,
    #[serde(default)]
    pub token_contract: Option<Address>,
    pub token_symbol: String,
    /// Amount in token units (already scaled by the token's decimals).
    pub amount: Decimal,
}

/// A transfer seen from the analysed wallet's side: BUY when it received
/// the tokens, SELL when it sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedTransfer {
    pub transaction_hash: B256,
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    pub amount: Decimal,
}

/// Time-ordered transfer history of one token for one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenHistory {
    /// Result-map key: upper-cased symbol, suffixed with the short contract
    /// address when two contracts share a symbol.
    pub key: String,
    pub symbol: String,
    pub token_contract: Option<Address>,
    pub transfers: Vec<TaggedTransfer>,
}
