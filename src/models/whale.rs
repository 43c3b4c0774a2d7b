use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A large wrapped-ether transfer reported by the indexing source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargeTransfer {
    pub transaction_hash: B256,
    /// Account that sent the transaction carrying the transfer.
    pub initiator: Address,
    pub src: Address,
    pub dst: Address,
    /// Amount in whole WETH.
    pub amount: Decimal,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub block_timestamp: DateTime<Utc>,
}

/// A wallet flagged as a whale candidate, with the transaction that
/// surfaced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhaleDetection {
    pub address: Address,
    pub transaction_hash: B256,
}
