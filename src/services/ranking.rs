use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AnalysisError;
use crate::ingestion::normalize_transfers;
use crate::intelligence::composition::{self, CompositionScore};
use crate::intelligence::{
    aggregate, rank, run_ledger, LedgerDesync, PortfolioPerformance, PriceSeries,
    ProfitLossResult, RankedWhale,
};
use crate::models::{short_address, TokenHistory};
use crate::providers::{with_timeout, ChainDataProvider, PriceProvider};

/// Data sources a ranking pass reads from.
#[derive(Clone)]
pub struct RankingProviders {
    pub chain: Arc<dyn ChainDataProvider>,
    pub prices: Arc<dyn PriceProvider>,
}

#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub max_concurrent_wallets: usize,
    pub provider_timeout: Duration,
}

impl From<&AppConfig> for RankingConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_concurrent_wallets: config.max_concurrent_wallets,
            provider_timeout: config.provider_timeout(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_wallets: 8,
            provider_timeout: Duration::from_secs(30),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything computed for one wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletAnalysis {
    pub wallet: Address,
    pub composition: CompositionScore,
    pub performance: PortfolioPerformance,
    /// Tokens left out of the P&L: no price identifier, no price data, or the
    /// token's task crashed.
    pub skipped_tokens: Vec<String>,
    pub desyncs: Vec<TokenDesync>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenDesync {
    pub token: String,
    #[serde(flatten)]
    pub desync: LedgerDesync,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletFailure {
    pub wallet: Address,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Best first.
    pub ranked: Vec<RankedWhale>,
    pub analyses: BTreeMap<Address, WalletAnalysis>,
    pub failures: Vec<WalletFailure>,
}

impl RankingReport {
    /// Ranked wallets scoring at least `min_score`, best first.
    pub fn qualified(&self, min_score: u32) -> Vec<RankedWhale> {
        self.ranked
            .iter()
            .filter(|r| r.score >= min_score)
            .copied()
            .collect()
    }

    pub fn score_of(&self, wallet: &Address) -> Option<u32> {
        self.ranked.iter().find(|r| r.wallet == *wallet).map(|r| r.score)
    }
}

// ---------------------------------------------------------------------------
// Per-token analysis
// ---------------------------------------------------------------------------

enum TokenOutcome {
    Priced {
        key: String,
        result: ProfitLossResult,
        desyncs: Vec<LedgerDesync>,
    },
    Skipped {
        key: String,
        reason: String,
    },
}

/// Resolve the token's price series and replay its history through a
/// ledger. Missing price data skips the token; provider errors propagate.
async fn analyze_token(
    prices: Arc<dyn PriceProvider>,
    history: TokenHistory,
    timeout: Duration,
) -> Result<TokenOutcome, AnalysisError> {
    let identifier =
        match with_timeout(timeout, prices.resolve_token_identifier(&history.symbol)).await? {
            Some(id) => id,
            None => {
                return Ok(TokenOutcome::Skipped {
                    key: history.key,
                    reason: format!("no price identifier for {}", history.symbol),
                })
            }
        };

    let bars = with_timeout(timeout, prices.daily_bars(&identifier)).await?;
    let series = PriceSeries::new(identifier, bars);

    match run_ledger(&history.transfers, &series) {
        Ok(ledger) => Ok(TokenOutcome::Priced {
            key: history.key,
            result: ledger.result(),
            desyncs: ledger.desyncs().to_vec(),
        }),
        Err(AnalysisError::NoData(reason)) => Ok(TokenOutcome::Skipped {
            key: history.key,
            reason,
        }),
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Per-wallet analysis
// ---------------------------------------------------------------------------

/// Analyse one wallet:
/// 1. Fetch holdings and score their composition (nothing of value → NoData)
/// 2. Fetch and normalise the transfer history
/// 3. Price and replay each token concurrently
/// 4. Aggregate per-token P&L into portfolio performance
///
/// The first provider error aborts the wallet; in-flight token tasks are
/// cancelled when the JoinSet drops.
pub async fn analyze_wallet(
    providers: &RankingProviders,
    wallet: Address,
    config: &RankingConfig,
) -> Result<WalletAnalysis, AnalysisError> {
    let timeout = config.provider_timeout;

    // Step 1: Composition
    let holdings = with_timeout(timeout, providers.chain.token_balances(wallet)).await?;
    let composition = composition::score(&holdings)?;

    // Step 2: Transfer history
    let transfers = with_timeout(timeout, providers.chain.token_transfers(wallet)).await?;
    let histories = normalize_transfers(wallet, &transfers);

    tracing::debug!(
        wallet = %short_address(&wallet),
        holdings = holdings.len(),
        tokens = histories.len(),
        "Analysing wallet"
    );

    // Step 3: One task per token
    let mut tasks = JoinSet::new();
    let mut task_tokens: HashMap<Id, String> = HashMap::new();
    for history in histories {
        let key = history.key.clone();
        let handle = tasks.spawn(analyze_token(providers.prices.clone(), history, timeout));
        task_tokens.insert(handle.id(), key);
    }

    let mut results: BTreeMap<String, ProfitLossResult> = BTreeMap::new();
    let mut skipped_tokens = Vec::new();
    let mut desyncs = Vec::new();

    while let Some(joined) = tasks.join_next_with_id().await {
        let outcome = match joined {
            Ok((_, outcome)) => outcome?,
            Err(e) => {
                let key = task_tokens
                    .remove(&e.id())
                    .unwrap_or_else(|| format!("task {}", e.id()));
                counter!("tokens_skipped_total").increment(1);
                tracing::error!(wallet = %wallet, token = %key, error = %e, "Token task panicked");
                skipped_tokens.push(key);
                continue;
            }
        };

        match outcome {
            TokenOutcome::Priced {
                key,
                result,
                desyncs: token_desyncs,
            } => {
                for desync in token_desyncs {
                    counter!("ledger_desync_total").increment(1);
                    tracing::warn!(
                        wallet = %wallet,
                        token = %key,
                        tx = %desync.transaction_hash,
                        tracked_balance = %desync.tracked_balance,
                        sell_amount = %desync.sell_amount,
                        "Sell exceeds tracked balance, costing excess at average"
                    );
                    desyncs.push(TokenDesync {
                        token: key.clone(),
                        desync,
                    });
                }
                results.insert(key, result);
            }
            TokenOutcome::Skipped { key, reason } => {
                counter!("tokens_skipped_total").increment(1);
                tracing::warn!(wallet = %wallet, token = %key, reason = %reason, "Token skipped");
                skipped_tokens.push(key);
            }
        }
    }

    // Task completion order is arbitrary
    skipped_tokens.sort();
    desyncs.sort_by(|a, b| {
        (a.token.as_str(), a.desync.timestamp).cmp(&(b.token.as_str(), b.desync.timestamp))
    });

    // Step 4: Portfolio
    let performance = aggregate(&results);

    Ok(WalletAnalysis {
        wallet,
        composition,
        performance,
        skipped_tokens,
        desyncs,
    })
}

// ---------------------------------------------------------------------------
// Ranking pass
// ---------------------------------------------------------------------------

/// Analyse every wallet concurrently (bounded by `max_concurrent_wallets`)
/// and rank the ones that completed. A failing wallet is reported and never
/// affects the others.
pub async fn run_ranking_pass(
    providers: &RankingProviders,
    wallets: &[Address],
    config: &RankingConfig,
) -> RankingReport {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let start = Instant::now();

    let unique: BTreeSet<Address> = wallets.iter().copied().collect();
    tracing::info!(%run_id, wallets = unique.len(), "Ranking pass started");

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_wallets.max(1)));
    let mut tasks = JoinSet::new();
    let mut task_wallets: HashMap<Id, Address> = HashMap::new();

    for wallet in unique {
        let semaphore = semaphore.clone();
        let providers = providers.clone();
        let config = config.clone();

        let handle = tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            (wallet, analyze_wallet(&providers, wallet, &config).await)
        });
        task_wallets.insert(handle.id(), wallet);
    }

    let mut analyses = BTreeMap::new();
    let mut failures = Vec::new();

    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((_, (wallet, Ok(analysis)))) => {
                counter!("wallets_analyzed_total").increment(1);
                analyses.insert(wallet, analysis);
            }
            Ok((_, (wallet, Err(e)))) => {
                counter!("wallets_failed_total").increment(1);
                tracing::warn!(wallet = %wallet, error = %e, "Wallet analysis failed");
                failures.push(WalletFailure {
                    wallet,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                counter!("wallets_failed_total").increment(1);
                match task_wallets.remove(&e.id()) {
                    Some(wallet) => {
                        tracing::error!(wallet = %wallet, error = %e, "Wallet task panicked");
                        failures.push(WalletFailure {
                            wallet,
                            reason: format!("analysis crashed: {e}"),
                        });
                    }
                    None => tracing::error!(error = %e, "Untracked wallet task panicked"),
                }
            }
        }
    }

    failures.sort_by_key(|f| f.wallet);

    let compositions: BTreeMap<Address, CompositionScore> = analyses
        .iter()
        .map(|(wallet, a)| (*wallet, a.composition.clone()))
        .collect();
    let performances: BTreeMap<Address, PortfolioPerformance> = analyses
        .iter()
        .map(|(wallet, a)| (*wallet, a.performance.clone()))
        .collect();

    let ranked = rank(&compositions, &performances);

    counter!("ranking_passes_total").increment(1);
    histogram!("ranking_pass_seconds").record(start.elapsed().as_secs_f64());

    tracing::info!(
        %run_id,
        ranked = ranked.len(),
        failed = failures.len(),
        top_score = ranked.first().map(|r| r.score).unwrap_or(0),
        "Ranking pass complete"
    );

    RankingReport {
        run_id,
        started_at,
        completed_at: Utc::now(),
        ranked,
        analyses,
        failures,
    }
}
