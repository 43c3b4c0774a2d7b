use std::collections::HashSet;

use alloy::primitives::{b256, Address, B256, U256};

use super::routers::RouterRegistry;
use crate::models::{ReceiptLog, SwapRecord, TransactionReceipt};

/// Keccak256 of `Transfer(address,address,uint256)`.
pub const TRANSFER_EVENT_SIGNATURE: B256 =
    b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");

/// A decoded ERC-20 `Transfer` log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Erc20Transfer {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

/// Recognises DEX swaps in transaction receipts.
#[derive(Debug, Clone, Default)]
pub struct SwapDetector {
    registry: RouterRegistry,
}

impl SwapDetector {
    pub fn new(registry: RouterRegistry) -> Self {
        Self { registry }
    }

    /// Classify `receipt` as a swap through a known router.
    ///
    /// The input token is the first transfer sent by the transaction sender,
    /// the output token the last transfer it received. When the sender never
    /// moves tokens itself (smart-contract wallets, relayed transactions),
    /// `activity_pair` names the addresses the watched activity was reported
    /// between and the tokens are inferred from transfers touching that pair.
    /// That inference is a heuristic and can mislabel multi-hop routes.
    ///
    /// Returns `None` for anything that is not a swap, including
    /// wraps/unwraps where input and output token coincide.
    pub fn detect(
        &self,
        receipt: &TransactionReceipt,
        activity_pair: Option<(Address, Address)>,
    ) -> Option<SwapRecord> {
        let involved = involved_addresses(receipt);
        let protocol = self.registry.match_protocol(&involved)?;

        let transfers = decode_transfers(&receipt.logs);
        let initiator = receipt.from;

        let (input, output) = match primary_tokens(&transfers, initiator) {
            Some(tokens) => tokens,
            None => fallback_tokens(&transfers, activity_pair?)?,
        };

        match SwapRecord::new(protocol, initiator, input, output) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(
                    tx = %receipt.transaction_hash,
                    protocol,
                    error = %e,
                    "Discarding swap candidate"
                );
                None
            }
        }
    }
}

/// Sender, recipient, every log emitter and every topic read as an address.
pub fn involved_addresses(receipt: &TransactionReceipt) -> HashSet<Address> {
    let mut involved = HashSet::new();
    involved.insert(receipt.from);
    involved.extend(receipt.to);

    for log in &receipt.logs {
        involved.insert(log.address);
        involved.extend(log.topics.iter().map(|topic| Address::from_word(*topic)));
    }

    involved
}

/// Decode ERC-20 `Transfer` logs in log order. Logs with the same signature
/// but a fourth indexed topic (ERC-721) are skipped.
pub fn decode_transfers(logs: &[ReceiptLog]) -> Vec<Erc20Transfer> {
    logs.iter().filter_map(decode_transfer).collect()
}

fn decode_transfer(log: &ReceiptLog) -> Option<Erc20Transfer> {
    match log.topics.as_slice() {
        [signature, from, to] if *signature == TRANSFER_EVENT_SIGNATURE => {
            let value = if log.data.len() >= 32 {
                U256::from_be_slice(&log.data[..32])
            } else {
                U256::ZERO
            };

            Some(Erc20Transfer {
                token: log.address,
                from: Address::from_word(*from),
                to: Address::from_word(*to),
                value,
            })
        }
        _ => None,
    }
}

fn primary_tokens(transfers: &[Erc20Transfer], initiator: Address) -> Option<(Address, Address)> {
    let input = transfers.iter().find(|t| t.from == initiator)?;
    let output = transfers.iter().rev().find(|t| t.to == initiator)?;
    Some((input.token, output.token))
}

fn fallback_tokens(
    transfers: &[Erc20Transfer],
    (from, to): (Address, Address),
) -> Option<(Address, Address)> {
    let in_pair = |addr: &Address| *addr == from || *addr == to;

    let touching: Vec<&Erc20Transfer> = transfers
        .iter()
        .filter(|t| in_pair(&t.from) || in_pair(&t.to))
        .collect();

    if touching.len() < 2 {
        return None;
    }

    let input = touching.iter().find(|t| in_pair(&t.from))?;
    let output = touching.iter().rev().find(|t| in_pair(&t.to))?;
    Some((input.token, output.token))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Bytes};

    const AERODROME: Address = address!("cF77a3Ba9A5CA399B7c97c74d54e5b1Beb874E43");
    const WHALE: Address = address!("35e34708c7361f99041a9b046c72ea3fcb29134c");
    const POOL: Address = address!("00000000000000000000000000000000000000aa");
    const TOKEN_A: Address = address!("4200000000000000000000000000000000000006");
    const TOKEN_B: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

    fn transfer_log(token: Address, from: Address, to: Address, value: u64) -> ReceiptLog {
        ReceiptLog {
            address: token,
            topics: vec![TRANSFER_EVENT_SIGNATURE, from.into_word(), to.into_word()],
            data: Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec()),
        }
    }

    fn receipt(from: Address, to: Address, logs: Vec<ReceiptLog>) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: B256::repeat_byte(0x01),
            from,
            to: Some(to),
            logs,
        }
    }

    fn detector() -> SwapDetector {
        SwapDetector::new(RouterRegistry::base_mainnet())
    }

    #[test]
    fn test_simple_swap() {
        let r = receipt(
            WHALE,
            AERODROME,
            vec![
                transfer_log(TOKEN_A, WHALE, POOL, 1_000),
                transfer_log(TOKEN_B, POOL, WHALE, 3_000),
            ],
        );

        let swap = detector().detect(&r, None).expect("swap");
        assert_eq!(swap.protocol, "Aerodrome");
        assert_eq!(swap.initiator, WHALE);
        assert_eq!(swap.input_token, TOKEN_A);
        assert_eq!(swap.output_token, TOKEN_B);
    }

    #[test]
    fn test_router_found_in_topic() {
        // Sent to an unknown aggregator that forwards to the router
        let aggregator = Address::repeat_byte(0x77);
        let mut logs = vec![
            transfer_log(TOKEN_A, WHALE, AERODROME, 1_000),
            transfer_log(TOKEN_B, POOL, WHALE, 3_000),
        ];
        logs[0].address = TOKEN_A;

        let swap = detector().detect(&receipt(WHALE, aggregator, logs), None);
        assert_eq!(swap.map(|s| s.protocol), Some("Aerodrome".to_string()));
    }

    #[test]
    fn test_no_router_match() {
        let r = receipt(
            WHALE,
            Address::repeat_byte(0x77),
            vec![
                transfer_log(TOKEN_A, WHALE, POOL, 1_000),
                transfer_log(TOKEN_B, POOL, WHALE, 3_000),
            ],
        );
        assert_eq!(detector().detect(&r, None), None);
    }

    #[test]
    fn test_same_token_both_sides_is_discarded() {
        let r = receipt(
            WHALE,
            AERODROME,
            vec![
                transfer_log(TOKEN_A, WHALE, POOL, 1_000),
                transfer_log(TOKEN_A, POOL, WHALE, 990),
            ],
        );
        assert_eq!(detector().detect(&r, None), None);
    }

    #[test]
    fn test_multi_hop_uses_outer_tokens() {
        let mid = Address::repeat_byte(0x55);
        let r = receipt(
            WHALE,
            AERODROME,
            vec![
                transfer_log(TOKEN_A, WHALE, POOL, 1_000),
                transfer_log(mid, POOL, Address::repeat_byte(0x66), 500),
                transfer_log(TOKEN_B, Address::repeat_byte(0x66), WHALE, 3_000),
            ],
        );

        let swap = detector().detect(&r, None).expect("swap");
        assert_eq!((swap.input_token, swap.output_token), (TOKEN_A, TOKEN_B));
    }

    #[test]
    fn test_fallback_through_smart_wallet() {
        let relayer = Address::repeat_byte(0x99);
        let smart_wallet = Address::repeat_byte(0x42);
        let r = receipt(
            relayer,
            AERODROME,
            vec![
                transfer_log(TOKEN_A, smart_wallet, POOL, 1_000),
                transfer_log(TOKEN_B, POOL, smart_wallet, 3_000),
            ],
        );

        assert_eq!(detector().detect(&r, None), None);

        let swap = detector()
            .detect(&r, Some((smart_wallet, AERODROME)))
            .expect("fallback swap");
        assert_eq!(swap.initiator, relayer);
        assert_eq!((swap.input_token, swap.output_token), (TOKEN_A, TOKEN_B));
    }

    #[test]
    fn test_fallback_needs_two_transfers() {
        let relayer = Address::repeat_byte(0x99);
        let smart_wallet = Address::repeat_byte(0x42);
        let r = receipt(
            relayer,
            AERODROME,
            vec![transfer_log(TOKEN_A, smart_wallet, POOL, 1_000)],
        );
        assert_eq!(detector().detect(&r, Some((smart_wallet, POOL))), None);
    }

    #[test]
    fn test_fallback_same_token_is_discarded() {
        let relayer = Address::repeat_byte(0x99);
        let smart_wallet = Address::repeat_byte(0x42);
        let r = receipt(
            relayer,
            AERODROME,
            vec![
                transfer_log(TOKEN_A, smart_wallet, POOL, 1_000),
                transfer_log(TOKEN_A, POOL, smart_wallet, 400),
            ],
        );

        assert_eq!(detector().detect(&r, Some((smart_wallet, AERODROME))), None);
    }

    #[test]
    fn test_fallback_when_initiator_only_sends() {
        // Output is delivered to a separate recipient
        let recipient = Address::repeat_byte(0x43);
        let r = receipt(
            WHALE,
            AERODROME,
            vec![
                transfer_log(TOKEN_A, WHALE, POOL, 1_000),
                transfer_log(TOKEN_B, POOL, recipient, 3_000),
            ],
        );

        assert_eq!(detector().detect(&r, None), None);

        let swap = detector()
            .detect(&r, Some((WHALE, recipient)))
            .expect("fallback swap");
        assert_eq!(swap.initiator, WHALE);
        assert_eq!((swap.input_token, swap.output_token), (TOKEN_A, TOKEN_B));
    }

    #[test]
    fn test_decode_skips_erc721_and_other_events() {
        let mut nft = transfer_log(TOKEN_A, WHALE, POOL, 0);
        nft.topics.push(B256::with_last_byte(7));
        let other = ReceiptLog {
            address: POOL,
            topics: vec![B256::repeat_byte(0xab)],
            data: Bytes::new(),
        };
        let erc20 = transfer_log(TOKEN_B, POOL, WHALE, 42);

        let decoded = decode_transfers(&[nft, other, erc20]);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].token, TOKEN_B);
        assert_eq!(decoded[0].value, U256::from(42));
    }

    #[test]
    fn test_involved_addresses_include_topics() {
        let r = receipt(WHALE, AERODROME, vec![transfer_log(TOKEN_A, POOL, TOKEN_B, 1)]);
        let involved = involved_addresses(&r);
        for addr in [WHALE, AERODROME, TOKEN_A, POOL, TOKEN_B] {
            assert!(involved.contains(&addr));
        }
    }
}
