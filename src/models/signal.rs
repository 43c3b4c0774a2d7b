use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A swap by a ranked whale that is worth mirroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorSignal {
    /// Whale's wallet address.
    pub wallet: Address,
    /// DEX protocol the swap was routed through.
    pub protocol: String,
    /// Token the whale gave up.
    pub input_token: Address,
    /// Token the whale received.
    pub output_token: Address,
    pub transaction_hash: B256,
    /// Whale's trader-efficiency score at the time of the swap.
    pub whale_score: u32,
    pub detected_at: DateTime<Utc>,
}
