use alloy::primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance snapshot of one token held by a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletHolding {
    /// `None` for the native asset.
    #[serde(default)]
    pub token_contract: Option<Address>,
    pub symbol: String,
    pub balance: Decimal,
    pub value_usd: Decimal,
}
