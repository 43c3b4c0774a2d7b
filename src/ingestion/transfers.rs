use std::collections::{BTreeMap, HashMap};

use alloy::primitives::Address;
use rust_decimal::Decimal;

use crate::models::{short_address, Side, TaggedTransfer, TokenHistory, TokenTransfer};

/// Split a wallet's raw transfer feed into one time-ordered history per
/// token, tagged from the wallet's point of view.
///
/// Self-transfers, transfers not touching the wallet and non-positive
/// amounts are dropped. Histories are keyed by upper-cased symbol; when
/// several contracts share a symbol each contract's key gets its short
/// address appended (`USDC@0x8335…2913`), the native asset keeps the bare
/// symbol. Output is ordered by key.
pub fn normalize_transfers(wallet: Address, transfers: &[TokenTransfer]) -> Vec<TokenHistory> {
    let mut groups: HashMap<Option<Address>, TokenHistory> = HashMap::new();

    for transfer in transfers {
        if transfer.from_address == transfer.to_address || transfer.amount <= Decimal::ZERO {
            continue;
        }

        let side = if transfer.from_address == wallet {
            Side::Sell
        } else if transfer.to_address == wallet {
            Side::Buy
        } else {
            continue;
        };

        let history = groups
            .entry(transfer.token_contract)
            .or_insert_with(|| TokenHistory {
                key: transfer.token_symbol.to_uppercase(),
                symbol: transfer.token_symbol.clone(),
                token_contract: transfer.token_contract,
                transfers: Vec::new(),
            });

        history.transfers.push(TaggedTransfer {
            transaction_hash: transfer.transaction_hash,
            timestamp: transfer.timestamp,
            side,
            amount: transfer.amount,
        });
    }

    let mut symbol_counts: HashMap<String, usize> = HashMap::new();
    for history in groups.values() {
        *symbol_counts.entry(history.key.clone()).or_default() += 1;
    }

    let mut by_key = BTreeMap::new();
    for (contract, mut history) in groups {
        if let Some(contract) = contract {
            if symbol_counts.get(&history.key).copied().unwrap_or(0) > 1 {
                history.key = format!("{}@{}", history.key, short_address(&contract));
            }
        }

        // Stable: same-second transfers keep feed order
        history.transfers.sort_by_key(|t| t.timestamp);
        by_key.insert(history.key.clone(), history);
    }

    by_key.into_values().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
