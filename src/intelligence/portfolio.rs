use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cost_basis::ProfitLossResult;

/// Result key under which ETH and WETH are reported together.
pub const MERGED_ETH_KEY: &str = "ETH/WETH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPerformanceMetrics {
    #[serde(flatten)]
    pub result: ProfitLossResult,
    /// 0–100, see [`profitability_score`].
    pub profitability_score: Decimal,
    /// Signed share of the portfolio's absolute net P&L, in percent.
    pub contribution_percent: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    /// Net-profit-weighted mean profitability over tokens with net > 0.
    pub global_score: Decimal,
    pub total_net_profit: Decimal,
    pub token_metrics: BTreeMap<String, TokenPerformanceMetrics>,
    pub profitable_tokens: u32,
    pub unprofitable_tokens: u32,
}

// ---------------------------------------------------------------------------
// Per-token profitability
// ---------------------------------------------------------------------------

/// 0 with no realised P&L, 100 with profit and no loss, otherwise
/// `profit / loss × 50` capped at 100 (break-even scores 50).
pub fn profitability_score(result: &ProfitLossResult) -> Decimal {
    if result.total_profit.is_zero() && result.total_loss.is_zero() {
        return Decimal::ZERO;
    }

    if result.total_loss.is_zero() {
        return Decimal::ONE_HUNDRED;
    }

    let ratio = result.total_profit / result.total_loss;
    (ratio * Decimal::from(50)).min(Decimal::ONE_HUNDRED)
}

fn merge(a: &ProfitLossResult, b: &ProfitLossResult) -> ProfitLossResult {
    ProfitLossResult {
        total_profit: a.total_profit + b.total_profit,
        total_loss: a.total_loss + b.total_loss,
        net_profit: a.net_profit + b.net_profit,
        trade_count: a.trade_count + b.trade_count,
    }
}

// ---------------------------------------------------------------------------
// Portfolio aggregation
// ---------------------------------------------------------------------------

/// Fold per-token P&L (keyed by upper-cased symbol) into a wallet-level
/// performance summary.
pub fn aggregate(results: &BTreeMap<String, ProfitLossResult>) -> PortfolioPerformance {
    let total_net_profit = results.values().map(|r| r.total_profit).sum::<Decimal>()
        - results.values().map(|r| r.total_loss).sum::<Decimal>();

    let mut merged = results.clone();
    if let (Some(eth), Some(weth)) = (results.get("ETH"), results.get("WETH")) {
        merged.insert(MERGED_ETH_KEY.to_string(), merge(eth, weth));
        merged.remove("ETH");
        merged.remove("WETH");
    }

    let absolute_total: Decimal = merged.values().map(|r| r.net_profit.abs()).sum();

    let token_metrics: BTreeMap<String, TokenPerformanceMetrics> = merged
        .into_iter()
        .map(|(key, result)| {
            let contribution_percent = if absolute_total.is_zero() {
                Decimal::ZERO
            } else {
                result.net_profit / absolute_total * Decimal::ONE_HUNDRED
            };

            let metrics = TokenPerformanceMetrics {
                profitability_score: profitability_score(&result),
                contribution_percent,
                result,
            };
            (key, metrics)
        })
        .collect();

    let profitable: Vec<&TokenPerformanceMetrics> = token_metrics
        .values()
        .filter(|m| m.result.net_profit > Decimal::ZERO)
        .collect();
    let unprofitable_tokens = token_metrics
        .values()
        .filter(|m| m.result.net_profit < Decimal::ZERO)
        .count() as u32;

    let weight: Decimal = profitable.iter().map(|m| m.result.net_profit).sum();
    let global_score = if weight.is_zero() {
        Decimal::ZERO
    } else {
        profitable
            .iter()
            .map(|m| m.profitability_score * m.result.net_profit)
            .sum::<Decimal>()
            / weight
    };

    PortfolioPerformance {
        global_score,
        total_net_profit,
        profitable_tokens: profitable.len() as u32,
        unprofitable_tokens,
        token_metrics,
    }
}

impl PortfolioPerformance {
    /// Mean profitability score over every reported token (0 when empty).
    pub fn mean_profitability(&self) -> Decimal {
        if self.token_metrics.is_empty() {
            return Decimal::ZERO;
        }

        self.token_metrics
            .values()
            .map(|m| m.profitability_score)
            .sum::<Decimal>()
            / Decimal::from(self.token_metrics.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
