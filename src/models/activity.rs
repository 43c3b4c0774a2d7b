use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;

// ---------------------------------------------------------------------------
// Receipt (chain-data provider)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLog {
    /// Contract that emitted the log.
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<B256>,
    #[serde(default)]
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub from: Address,
    /// `None` for contract creations.
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub logs: Vec<ReceiptLog>,
}

// ---------------------------------------------------------------------------
// Address activity notification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    External,
    Token,
    #[serde(other)]
    Other,
}

/// A single activity entry pushed for a watched address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressActivity {
    pub hash: B256,
    pub from_address: Address,
    pub to_address: Address,
    pub category: ActivityCategory,
}

// ---------------------------------------------------------------------------
// SwapRecord
// ---------------------------------------------------------------------------

/// A transaction recognised as a DEX swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub protocol: String,
    pub initiator: Address,
    pub input_token: Address,
    pub output_token: Address,
}

impl SwapRecord {
    /// Build a record, rejecting swaps whose input and output token match
    /// (wraps, unwraps, self-transfers).
    pub fn new(
        protocol: impl Into<String>,
        initiator: Address,
        input_token: Address,
        output_token: Address,
    ) -> Result<Self, AnalysisError> {
        if input_token == output_token {
            return Err(AnalysisError::InvalidSwap { token: input_token });
        }

        Ok(Self {
            protocol: protocol.into(),
            initiator,
            input_token,
            output_token,
        })
    }
}
