use std::collections::HashMap;
use std::path::Path;

use alloy::primitives::{Address, B256};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChainDataProvider, PriceProvider, ProviderError, WhaleSource};
use crate::models::{
    AddressActivity, DailyPriceBar, LargeTransfer, TokenTransfer, TransactionReceipt,
    WalletHolding,
};

// ---------------------------------------------------------------------------
// On-disk layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletRecord {
    pub address: Address,
    #[serde(default)]
    pub transfers: Vec<TokenTransfer>,
    #[serde(default)]
    pub holdings: Vec<WalletHolding>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeriesRecord {
    pub identifier: String,
    #[serde(default)]
    pub bars: Vec<DailyPriceBar>,
}

/// Pre-fetched provider data for a set of wallets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub wallets: Vec<WalletRecord>,
    #[serde(default)]
    pub receipts: Vec<TransactionReceipt>,
    #[serde(default)]
    pub price_series: Vec<PriceSeriesRecord>,
    /// Display name or symbol → price series identifier.
    #[serde(default)]
    pub token_identifiers: HashMap<String, String>,
    #[serde(default)]
    pub large_transfers: Vec<LargeTransfer>,
    #[serde(default)]
    pub activities: Vec<AddressActivity>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// In-memory provider serving every trait from a [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotProvider {
    wallets: HashMap<Address, WalletRecord>,
    receipts: HashMap<B256, TransactionReceipt>,
    bars: HashMap<String, Vec<DailyPriceBar>>,
    identifiers: HashMap<String, String>,
    large_transfers: Vec<LargeTransfer>,
    activities: Vec<AddressActivity>,
}

impl SnapshotProvider {
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            wallets: snapshot
                .wallets
                .into_iter()
                .map(|w| (w.address, w))
                .collect(),
            receipts: snapshot
                .receipts
                .into_iter()
                .map(|r| (r.transaction_hash, r))
                .collect(),
            bars: snapshot
                .price_series
                .into_iter()
                .map(|s| (s.identifier, s.bars))
                .collect(),
            identifiers: snapshot
                .token_identifiers
                .into_iter()
                .map(|(name, id)| (name.to_lowercase(), id))
                .collect(),
            large_transfers: snapshot.large_transfers,
            activities: snapshot.activities,
        }
    }

    /// Load a JSON snapshot from disk.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;

        tracing::info!(
            wallets = snapshot.wallets.len(),
            receipts = snapshot.receipts.len(),
            series = snapshot.price_series.len(),
            "Snapshot loaded"
        );

        Ok(Self::from_snapshot(snapshot))
    }

    /// Wallets with recorded data, in address order.
    pub fn wallets(&self) -> Vec<Address> {
        let mut wallets: Vec<Address> = self.wallets.keys().copied().collect();
        wallets.sort();
        wallets
    }

    pub fn activities(&self) -> &[AddressActivity] {
        &self.activities
    }
}

#[async_trait]
impl ChainDataProvider for SnapshotProvider {
    async fn transaction_receipt(&self, hash: B256) -> Result<TransactionReceipt, ProviderError> {
        self.receipts
            .get(&hash)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("receipt {hash}")))
    }

    async fn token_transfers(&self, wallet: Address) -> Result<Vec<TokenTransfer>, ProviderError> {
        Ok(self
            .wallets
            .get(&wallet)
            .map(|w| w.transfers.clone())
            .unwrap_or_default())
    }

    async fn token_balances(&self, wallet: Address) -> Result<Vec<WalletHolding>, ProviderError> {
        Ok(self
            .wallets
            .get(&wallet)
            .map(|w| w.holdings.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl PriceProvider for SnapshotProvider {
    async fn resolve_token_identifier(
        &self,
        display_name: &str,
    ) -> Result<Option<String>, ProviderError> {
        Ok(self.identifiers.get(&display_name.to_lowercase()).cloned())
    }

    async fn daily_bars(&self, identifier: &str) -> Result<Vec<DailyPriceBar>, ProviderError> {
        Ok(self.bars.get(identifier).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl WhaleSource for SnapshotProvider {
    async fn large_transfers(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<LargeTransfer>, ProviderError> {
        Ok(self
            .large_transfers
            .iter()
            .filter(|t| t.block_timestamp >= since)
            .cloned()
            .collect())
    }
}
