pub mod activity;
pub mod holding;
pub mod price;
pub mod signal;
pub mod trade;
pub mod whale;

pub use activity::{ActivityCategory, AddressActivity, ReceiptLog, SwapRecord, TransactionReceipt};
pub use holding::WalletHolding;
pub use price::DailyPriceBar;
pub use signal::MirrorSignal;
pub use trade::{TaggedTransfer, TokenHistory, TokenTransfer};
pub use whale::{LargeTransfer, WhaleDetection};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Direction of a transfer relative to the analysed wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// The wallet received the tokens.
    Buy,
    /// The wallet sent the tokens.
    Sell,
}

/// Shortened `0x1234…abcd` form used in log lines and display keys.
pub fn short_address(address: &alloy::primitives::Address) -> String {
    let full = format!("{address:#x}");
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_short_address() {
        let addr = address!("4200000000000000000000000000000000000006");
        assert_eq!(short_address(&addr), "0x4200…0006");
    }
}
