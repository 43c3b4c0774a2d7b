use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;
use crate::models::WalletHolding;

pub const BLUE_CHIP_SYMBOLS: [&str; 10] = [
    "BTC", "ETH", "BNB", "SOL", "ADA", "DOT", "AVAX", "MATIC", "LINK", "UNI",
];

pub const STABLECOIN_SYMBOLS: [&str; 8] =
    ["USDT", "USDC", "DAI", "BUSD", "TUSD", "USDP", "GUSD", "FRAX"];

/// Heuristic quality score of a wallet's current holdings. Every component
/// is an integer in 0–100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionScore {
    pub token_count: u32,
    pub diversification_score: u32,
    pub concentration_score: u32,
    pub stablecoin_ratio_score: u32,
    pub bluechip_score: u32,
    pub total_score: u32,
}

/// Score a wallet's holdings. Holdings worth nothing are ignored; a wallet
/// with no valued holdings at all is `NoData`.
pub fn score(holdings: &[WalletHolding]) -> Result<CompositionScore, AnalysisError> {
    let mut values: Vec<(&str, Decimal)> = holdings
        .iter()
        .filter(|h| h.value_usd > Decimal::ZERO)
        .map(|h| (h.symbol.as_str(), h.value_usd))
        .collect();

    let total: Decimal = values.iter().map(|(_, v)| *v).sum();
    if total.is_zero() {
        return Err(AnalysisError::NoData("wallet holds nothing of value".into()));
    }

    // Largest positions first
    values.sort_by(|a, b| b.1.cmp(&a.1));

    let token_count = values.len() as u32;
    let top1 = values[0].1 / total;
    let top3 = values.iter().take(3).map(|(_, v)| *v).sum::<Decimal>() / total;
    let stable_share = share_of(&values, &STABLECOIN_SYMBOLS, total);
    let bluechip_share = share_of(&values, &BLUE_CHIP_SYMBOLS, total);

    let diversification_score = diversification_score(token_count);
    let concentration_score = concentration_score(top1, top3);
    let stablecoin_ratio_score = stablecoin_ratio_score(stable_share);
    let bluechip_score = bluechip_score(bluechip_share);

    let weighted = Decimal::from(diversification_score) * Decimal::new(25, 2)
        + Decimal::from(concentration_score) * Decimal::new(30, 2)
        + Decimal::from(stablecoin_ratio_score) * Decimal::new(20, 2)
        + Decimal::from(bluechip_score) * Decimal::new(25, 2);

    let total_score = weighted
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0);

    Ok(CompositionScore {
        token_count,
        diversification_score,
        concentration_score,
        stablecoin_ratio_score,
        bluechip_score,
        total_score,
    })
}

fn share_of(values: &[(&str, Decimal)], symbols: &[&str], total: Decimal) -> Decimal {
    values
        .iter()
        .filter(|(symbol, _)| symbols.iter().any(|s| s.eq_ignore_ascii_case(symbol)))
        .map(|(_, v)| *v)
        .sum::<Decimal>()
        / total
}

// ---------------------------------------------------------------------------
// Component scores
// ---------------------------------------------------------------------------

pub fn diversification_score(token_count: u32) -> u32 {
    match token_count {
        0..=1 => 20,
        2..=4 => 60,
        5..=15 => 100,
        16..=25 => 80,
        _ => 40,
    }
}

/// Starts at 100 and loses points for a dominant top holding and for a
/// top-three that carries most of the value.
pub fn concentration_score(top1_share: Decimal, top3_share: Decimal) -> u32 {
    let mut score: i32 = 100;

    if top1_share > Decimal::new(5, 1) {
        score -= 40;
    } else if top1_share > Decimal::new(3, 1) {
        score -= 20;
    }

    if top3_share > Decimal::new(8, 1) {
        score -= 30;
    } else if top3_share > Decimal::new(6, 1) {
        score -= 15;
    }

    score.max(0) as u32
}

pub fn stablecoin_ratio_score(share: Decimal) -> u32 {
    if share < Decimal::new(5, 2) {
        60
    } else if share <= Decimal::new(3, 1) {
        100
    } else if share <= Decimal::new(5, 1) {
        80
    } else {
        40
    }
}

pub fn bluechip_score(share: Decimal) -> u32 {
    if share < Decimal::new(2, 1) {
        40
    } else if share < Decimal::new(4, 1) {
        70
    } else if share <= Decimal::new(8, 1) {
        100
    } else {
        80
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
