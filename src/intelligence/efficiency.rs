use std::collections::BTreeMap;

use alloy::primitives::Address;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::composition::CompositionScore;
use super::portfolio::PortfolioPerformance;

/// A wallet and its trader-efficiency score (0–100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedWhale {
    pub wallet: Address,
    pub score: u32,
}

// ---------------------------------------------------------------------------
// Component 1: Token strategy (weight 0.4)
// ---------------------------------------------------------------------------

/// Mean of the normalised composition total and a re-weighted blend of its
/// components, in 0–1.
pub fn token_strategy_score(composition: &CompositionScore) -> Decimal {
    let normalized_total = Decimal::from(composition.total_score) / Decimal::ONE_HUNDRED;

    let balance = (Decimal::from(composition.diversification_score) * Decimal::new(3, 1)
        + Decimal::from(composition.concentration_score) * Decimal::new(2, 1)
        + Decimal::from(composition.stablecoin_ratio_score) * Decimal::new(2, 1)
        + Decimal::from(composition.bluechip_score) * Decimal::new(3, 1))
        / Decimal::ONE_HUNDRED;

    (normalized_total + balance) / Decimal::TWO
}

// ---------------------------------------------------------------------------
// Component 2: Realised performance (weight 0.6)
// ---------------------------------------------------------------------------

/// Blend of the global profitability score, the share of profitable tokens
/// and the mean per-token profitability, in 0–1.
pub fn performance_score(performance: &PortfolioPerformance) -> Decimal {
    let decided = performance.profitable_tokens + performance.unprofitable_tokens;
    let profitable_ratio = if decided == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(performance.profitable_tokens) / Decimal::from(decided)
    };

    let global = performance.global_score / Decimal::ONE_HUNDRED;
    let mean = performance.mean_profitability() / Decimal::ONE_HUNDRED;

    global * Decimal::new(4, 1) + profitable_ratio * Decimal::new(3, 1) + mean * Decimal::new(3, 1)
}

// ---------------------------------------------------------------------------
// Final score and ranking
// ---------------------------------------------------------------------------

pub fn trader_efficiency(composition: &CompositionScore, performance: &PortfolioPerformance) -> u32 {
    let blended = token_strategy_score(composition) * Decimal::new(4, 1)
        + performance_score(performance) * Decimal::new(6, 1);

    (blended * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or(0)
}

/// Score every wallet present in both maps, best first. Equal scores keep
/// address order.
pub fn rank(
    compositions: &BTreeMap<Address, CompositionScore>,
    performances: &BTreeMap<Address, PortfolioPerformance>,
) -> Vec<RankedWhale> {
    let mut ranked: Vec<RankedWhale> = compositions
        .iter()
        .filter_map(|(wallet, composition)| {
            performances.get(wallet).map(|performance| RankedWhale {
                wallet: *wallet,
                score: trader_efficiency(composition, performance),
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::cost_basis::ProfitLossResult;
    use crate::intelligence::portfolio::aggregate;

    fn single_eth_composition() -> CompositionScore {
        CompositionScore {
            token_count: 1,
            diversification_score: 20,
            concentration_score: 30,
            stablecoin_ratio_score: 60,
            bluechip_score: 80,
            total_score: 46,
        }
    }

    fn winning_performance() -> PortfolioPerformance {
        let results = BTreeMap::from([(
            "AERO".to_string(),
            ProfitLossResult {
                total_profit: Decimal::from(100),
                total_loss: Decimal::ZERO,
                net_profit: Decimal::from(100),
                trade_count: 2,
            },
        )]);
        aggregate(&results)
    }

    #[test]
    fn test_token_strategy_score() {
        // (0.46 + 0.48) / 2
        assert_eq!(token_strategy_score(&single_eth_composition()), Decimal::new(47, 2));
    }

    #[test]
    fn test_performance_score_perfect() {
        assert_eq!(performance_score(&winning_performance()), Decimal::ONE);
    }

    #[test]
    fn test_performance_score_without_trades_is_zero() {
        assert_eq!(performance_score(&PortfolioPerformance::default()), Decimal::ZERO);
    }

    #[test]
    fn test_trader_efficiency() {
        // 0.4 × 0.47 + 0.6 × 1.0 = 0.788
        let score = trader_efficiency(&single_eth_composition(), &winning_performance());
        assert_eq!(score, 79);

        // 0.4 × 0.47 = 0.188
        let idle = trader_efficiency(&single_eth_composition(), &PortfolioPerformance::default());
        assert_eq!(idle, 19);
    }

    #[test]
    fn test_rank_orders_by_score_then_address() {
        let low = Address::repeat_byte(0x01);
        let high_b = Address::repeat_byte(0x03);
        let high_a = Address::repeat_byte(0x02);
        let unscored = Address::repeat_byte(0x04);

        let compositions = BTreeMap::from([
            (low, single_eth_composition()),
            (high_b, single_eth_composition()),
            (high_a, single_eth_composition()),
            (unscored, single_eth_composition()),
        ]);
        let performances = BTreeMap::from([
            (low, PortfolioPerformance::default()),
            (high_b, winning_performance()),
            (high_a, winning_performance()),
        ]);

        let ranked = rank(&compositions, &performances);

        assert_eq!(
            ranked,
            vec![
                RankedWhale { wallet: high_a, score: 79 },
                RankedWhale { wallet: high_b, score: 79 },
                RankedWhale { wallet: low, score: 19 },
            ]
        );
    }

    #[test]
    fn test_rank_is_idempotent() {
        let wallet = Address::repeat_byte(0x09);
        let compositions = BTreeMap::from([(wallet, single_eth_composition())]);
        let performances = BTreeMap::from([(wallet, winning_performance())]);

        assert_eq!(rank(&compositions, &performances), rank(&compositions, &performances));
    }
}
