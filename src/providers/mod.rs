pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotProvider};

use std::future::Future;
use std::time::Duration;

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{DailyPriceBar, LargeTransfer, TokenTransfer, TransactionReceipt, WalletHolding};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("malformed provider data: {0}")]
    Malformed(String),
}

/// On-chain data source (receipts, transfer history, balances).
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    async fn transaction_receipt(&self, hash: B256) -> Result<TransactionReceipt, ProviderError>;

    async fn token_transfers(&self, wallet: Address) -> Result<Vec<TokenTransfer>, ProviderError>;

    async fn token_balances(&self, wallet: Address) -> Result<Vec<WalletHolding>, ProviderError>;
}

/// Historical daily price source.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Map a display name or symbol to the provider's series identifier.
    /// `Ok(None)` means the token is unknown and its P&L is skipped.
    async fn resolve_token_identifier(
        &self,
        display_name: &str,
    ) -> Result<Option<String>, ProviderError>;

    async fn daily_bars(&self, identifier: &str) -> Result<Vec<DailyPriceBar>, ProviderError>;
}

/// Indexer of large wrapped-ether transfers used to surface whale candidates.
#[async_trait]
pub trait WhaleSource: Send + Sync {
    async fn large_transfers(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<LargeTransfer>, ProviderError>;
}

/// Run a provider call under a deadline.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| ProviderError::Timeout(limit))?
}
