use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::models::{LargeTransfer, WhaleDetection};

/// Whale candidates among large WETH transfers: every distinct initiator of
/// a transfer of at least `min_amount`, in first-seen order, with the
/// transaction that surfaced it.
pub fn detect_whales(transfers: &[LargeTransfer], min_amount: Decimal) -> Vec<WhaleDetection> {
    let mut seen = HashSet::new();

    transfers
        .iter()
        .filter(|t| t.amount >= min_amount)
        .filter(|t| seen.insert(t.initiator))
        .map(|t| WhaleDetection {
            address: t.initiator,
            transaction_hash: t.transaction_hash,
        })
        .collect()
}
