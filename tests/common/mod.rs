use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{address, Address, Bytes, B256, U256};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use whaleseek::intelligence::swap_detector::TRANSFER_EVENT_SIGNATURE;
use whaleseek::models::{
    ActivityCategory, AddressActivity, DailyPriceBar, LargeTransfer, ReceiptLog, TokenTransfer,
    TransactionReceipt, WalletHolding,
};
use whaleseek::providers::snapshot::{PriceSeriesRecord, WalletRecord};
use whaleseek::providers::{
    ChainDataProvider, PriceProvider, ProviderError, Snapshot, SnapshotProvider,
};
use whaleseek::services::{RankingConfig, RankingProviders};

/// Diversified trader, profitable on AERO, losing on ETH/WETH.
pub const WHALE_A: Address = address!("00000000000000000000000000000000000000a1");
/// Single-asset holder whose only trade is an untracked sell.
pub const WHALE_B: Address = address!("00000000000000000000000000000000000000b2");
/// Holds nothing of value.
pub const BROKE: Address = address!("00000000000000000000000000000000000000c3");
/// Only ever moved small amounts.
pub const MINNOW: Address = address!("00000000000000000000000000000000000000d4");

pub const POOL: Address = address!("00000000000000000000000000000000000000ee");
pub const AERODROME_ROUTER: Address = address!("cF77a3Ba9A5CA399B7c97c74d54e5b1Beb874E43");
pub const WETH: Address = address!("4200000000000000000000000000000000000006");
pub const AERO: Address = address!("940181a94A35A4569E4529A3CDfB74e38FD98631");
pub const PEPE: Address = address!("52b492a33E447Cdb854c7FC19F1e57E8BfA1777D");

pub const SWAP_TX: B256 = B256::repeat_byte(0x5a);

/// Noon UTC on 2025-01-`day`.
pub fn noon(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap()
}

fn tx_hash(wallet: Address, n: u8) -> B256 {
    let mut bytes = [n; 32];
    bytes[..20].copy_from_slice(wallet.as_slice());
    B256::from(bytes)
}

fn transfer(
    wallet: Address,
    n: u8,
    day: u32,
    buy: bool,
    contract: Option<Address>,
    symbol: &str,
    amount: i64,
) -> TokenTransfer {
    let (from_address, to_address) = if buy { (POOL, wallet) } else { (wallet, POOL) };
    TokenTransfer {
        transaction_hash: tx_hash(wallet, n),
        timestamp: noon(day),
        from_address,
        to_address,
        token_contract: contract,
        token_symbol: symbol.to_string(),
        amount: Decimal::from(amount),
    }
}

fn holding(symbol: &str, value: i64) -> WalletHolding {
    WalletHolding {
        token_contract: None,
        symbol: symbol.to_string(),
        balance: Decimal::ONE,
        value_usd: Decimal::from(value),
    }
}

fn daily_bars(closes: &[i64]) -> Vec<DailyPriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let date = noon(i as u32 + 1).date_naive();
            DailyPriceBar {
                start_date: date,
                end_date: date,
                close: Decimal::from(*close),
            }
        })
        .collect()
}

fn large_transfer(initiator: Address, n: u8, amount: i64) -> LargeTransfer {
    LargeTransfer {
        transaction_hash: tx_hash(initiator, n),
        initiator,
        src: initiator,
        dst: POOL,
        amount: Decimal::from(amount),
        block_timestamp: Utc::now() - chrono::Duration::days(1),
    }
}

pub fn erc20_log(token: Address, from: Address, to: Address, value: u64) -> ReceiptLog {
    ReceiptLog {
        address: token,
        topics: vec![TRANSFER_EVENT_SIGNATURE, from.into_word(), to.into_word()],
        data: Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec()),
    }
}

/// WHALE_A swapping WETH for AERO through the Aerodrome router.
pub fn swap_receipt() -> TransactionReceipt {
    TransactionReceipt {
        transaction_hash: SWAP_TX,
        from: WHALE_A,
        to: Some(AERODROME_ROUTER),
        logs: vec![
            erc20_log(WETH, WHALE_A, POOL, 1_000_000),
            erc20_log(AERO, POOL, WHALE_A, 3_000_000),
        ],
    }
}

pub fn swap_activity() -> AddressActivity {
    AddressActivity {
        hash: SWAP_TX,
        from_address: WHALE_A,
        to_address: POOL,
        category: ActivityCategory::Token,
    }
}

/// Snapshot with three ranked candidates, one non-candidate and a swap.
///
/// Prices: ethereum 3000/3300/3600/3000, aerodrome 1/2/3 (Jan 1–4).
pub fn fixture_snapshot() -> Snapshot {
    let whale_a = WalletRecord {
        address: WHALE_A,
        transfers: vec![
            // AERO: 10@1, 10@2, sell 15@3 → profit 25
            transfer(WHALE_A, 1, 1, true, Some(AERO), "AERO", 10),
            transfer(WHALE_A, 2, 2, true, Some(AERO), "AERO", 10),
            transfer(WHALE_A, 3, 3, false, Some(AERO), "AERO", 15),
            // ETH: 1@3000, sell @3300 → profit 300
            transfer(WHALE_A, 4, 1, true, None, "ETH", 1),
            transfer(WHALE_A, 5, 2, false, None, "ETH", 1),
            // WETH: 1@3600, sell @3000 → loss 600
            transfer(WHALE_A, 6, 3, true, Some(WETH), "WETH", 1),
            transfer(WHALE_A, 7, 4, false, Some(WETH), "WETH", 1),
            // no price identifier
            transfer(WHALE_A, 8, 1, true, Some(PEPE), "PEPE", 1_000_000),
        ],
        holdings: vec![
            holding("ETH", 4_000),
            holding("AERO", 2_000),
            holding("USDC", 1_500),
            holding("DEGEN", 1_500),
            holding("LINK", 1_000),
        ],
    };

    let whale_b = WalletRecord {
        address: WHALE_B,
        transfers: vec![transfer(WHALE_B, 1, 2, false, Some(AERO), "AERO", 5)],
        holdings: vec![holding("ETH", 5_000)],
    };

    let broke = WalletRecord {
        address: BROKE,
        transfers: vec![],
        holdings: vec![holding("SPAM", 0)],
    };

    Snapshot {
        wallets: vec![whale_a, whale_b, broke],
        receipts: vec![swap_receipt()],
        price_series: vec![
            PriceSeriesRecord {
                identifier: "ethereum".into(),
                bars: daily_bars(&[3_000, 3_300, 3_600, 3_000]),
            },
            PriceSeriesRecord {
                identifier: "aerodrome".into(),
                bars: daily_bars(&[1, 2, 3]),
            },
        ],
        token_identifiers: HashMap::from([
            ("ETH".to_string(), "ethereum".to_string()),
            ("WETH".to_string(), "ethereum".to_string()),
            ("AERO".to_string(), "aerodrome".to_string()),
        ]),
        large_transfers: vec![
            large_transfer(WHALE_A, 1, 120),
            large_transfer(WHALE_B, 1, 75),
            large_transfer(BROKE, 1, 60),
            large_transfer(WHALE_A, 2, 200),
            large_transfer(MINNOW, 1, 10),
        ],
        activities: vec![swap_activity()],
    }
}

pub fn fixture_provider() -> Arc<SnapshotProvider> {
    Arc::new(SnapshotProvider::from_snapshot(fixture_snapshot()))
}

#[allow(dead_code)]
pub fn providers(provider: Arc<SnapshotProvider>) -> RankingProviders {
    RankingProviders {
        chain: provider.clone(),
        prices: provider,
    }
}

#[allow(dead_code)]
pub fn fast_config() -> RankingConfig {
    RankingConfig {
        max_concurrent_wallets: 2,
        provider_timeout: Duration::from_millis(200),
    }
}

/// How [`FaultyChain`] misbehaves for its target wallet.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Unavailable,
    Hang,
    Crash,
}

/// Chain provider that breaks transfer-history lookups for one wallet.
#[allow(dead_code)]
pub struct FaultyChain {
    pub inner: Arc<SnapshotProvider>,
    pub target: Address,
    pub fault: Fault,
}

#[async_trait]
impl ChainDataProvider for FaultyChain {
    async fn transaction_receipt(&self, hash: B256) -> Result<TransactionReceipt, ProviderError> {
        self.inner.transaction_receipt(hash).await
    }

    async fn token_transfers(&self, wallet: Address) -> Result<Vec<TokenTransfer>, ProviderError> {
        if wallet == self.target {
            match self.fault {
                Fault::Unavailable => {
                    return Err(ProviderError::Unavailable("indexer returned 503".into()))
                }
                Fault::Hang => tokio::time::sleep(Duration::from_secs(30)).await,
                Fault::Crash => panic!("transfer index corrupted for {wallet}"),
            }
        }
        self.inner.token_transfers(wallet).await
    }

    async fn token_balances(&self, wallet: Address) -> Result<Vec<WalletHolding>, ProviderError> {
        self.inner.token_balances(wallet).await
    }
}

/// Price provider whose series lookup crashes for one identifier.
#[allow(dead_code)]
pub struct CrashingPrices {
    pub inner: Arc<SnapshotProvider>,
    pub identifier: &'static str,
}

#[async_trait]
impl PriceProvider for CrashingPrices {
    async fn resolve_token_identifier(
        &self,
        display_name: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.inner.resolve_token_identifier(display_name).await
    }

    async fn daily_bars(&self, identifier: &str) -> Result<Vec<DailyPriceBar>, ProviderError> {
        if identifier == self.identifier {
            panic!("price cache poisoned for {identifier}");
        }
        self.inner.daily_bars(identifier).await
    }
}
