use std::collections::VecDeque;

use alloy::primitives::B256;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price_series::PriceSeries;
use crate::errors::AnalysisError;
use crate::models::{Side, TaggedTransfer};

/// Tokens bought in one transfer that have not been sold yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostLot {
    pub remaining: Decimal,
    /// USD cost of `remaining`.
    pub cost_basis: Decimal,
}

/// Realised P&L of one token for one wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitLossResult {
    pub total_profit: Decimal,
    pub total_loss: Decimal,
    pub net_profit: Decimal,
    pub trade_count: u32,
}

/// A SELL larger than the tracked balance. The history started after the
/// wallet already held the token, so part of the cost basis is unknown and
/// gets approximated at the average cost of the tracked lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerDesync {
    pub transaction_hash: B256,
    pub timestamp: DateTime<Utc>,
    pub tracked_balance: Decimal,
    pub sell_amount: Decimal,
    pub average_cost: Decimal,
}

/// FIFO cost-basis ledger for a single (wallet, token) pair.
#[derive(Debug, Clone, Default)]
pub struct CostBasisLedger {
    lots: VecDeque<CostLot>,
    token_balance: Decimal,
    total_profit: Decimal,
    total_loss: Decimal,
    trade_count: u32,
    desyncs: Vec<LedgerDesync>,
}

impl CostBasisLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book one transfer at `price` (USD per token unit).
    pub fn apply(&mut self, transfer: &TaggedTransfer, price: Decimal) {
        match transfer.side {
            Side::Buy => self.buy(transfer.amount, price),
            Side::Sell => self.sell(transfer, price),
        }
    }

    fn buy(&mut self, amount: Decimal, price: Decimal) {
        self.lots.push_back(CostLot {
            remaining: amount,
            cost_basis: amount * price,
        });
        self.token_balance += amount;
        self.trade_count += 1;
    }

    fn sell(&mut self, transfer: &TaggedTransfer, price: Decimal) {
        self.trade_count += 1;

        let amount = transfer.amount;
        let cost = if self.token_balance < amount {
            self.close_desynced(transfer, price)
        } else {
            self.consume_fifo(amount)
        };

        let pnl = amount * price - cost;
        if pnl > Decimal::ZERO {
            self.total_profit += pnl;
        } else {
            self.total_loss += pnl.abs();
        }
    }

    /// Cost of a SELL that exceeds the tracked balance: every tracked lot at
    /// its own cost, the untracked excess at the lots' average cost (or the
    /// sell price when nothing is tracked). Empties the ledger.
    fn close_desynced(&mut self, transfer: &TaggedTransfer, price: Decimal) -> Decimal {
        let tracked_amount: Decimal = self.lots.iter().map(|l| l.remaining).sum();
        let tracked_cost: Decimal = self.lots.iter().map(|l| l.cost_basis).sum();

        let average_cost = if tracked_amount > Decimal::ZERO {
            tracked_cost / tracked_amount
        } else {
            price
        };

        let excess = transfer.amount - self.token_balance;
        let cost = if tracked_amount > Decimal::ZERO {
            tracked_cost + excess * average_cost
        } else {
            transfer.amount * average_cost
        };

        self.desyncs.push(LedgerDesync {
            transaction_hash: transfer.transaction_hash,
            timestamp: transfer.timestamp,
            tracked_balance: self.token_balance,
            sell_amount: transfer.amount,
            average_cost,
        });

        self.lots.clear();
        self.token_balance = Decimal::ZERO;
        cost
    }

    /// Cost of selling `amount` out of the oldest lots first.
    fn consume_fifo(&mut self, amount: Decimal) -> Decimal {
        let mut to_sell = amount;
        let mut cost = Decimal::ZERO;

        while to_sell > Decimal::ZERO {
            let Some(lot) = self.lots.front_mut() else {
                break;
            };

            if lot.remaining <= to_sell {
                cost += lot.cost_basis;
                to_sell -= lot.remaining;
                self.token_balance -= lot.remaining;
                self.lots.pop_front();
            } else {
                let fraction = to_sell / lot.remaining;
                let partial = fraction * lot.cost_basis;
                cost += partial;

                lot.remaining -= to_sell;
                lot.cost_basis -= partial;
                self.token_balance -= to_sell;
                to_sell = Decimal::ZERO;
            }
        }

        cost
    }

    pub fn lots(&self) -> &VecDeque<CostLot> {
        &self.lots
    }

    pub fn token_balance(&self) -> Decimal {
        self.token_balance
    }

    pub fn desyncs(&self) -> &[LedgerDesync] {
        &self.desyncs
    }

    pub fn result(&self) -> ProfitLossResult {
        ProfitLossResult {
            total_profit: self.total_profit,
            total_loss: self.total_loss,
            net_profit: self.total_profit - self.total_loss,
            trade_count: self.trade_count,
        }
    }
}

/// Replay a time-ordered history through a fresh ledger, pricing each
/// transfer from `prices`. Fails with `NoData` when the series is empty and
/// there is anything to price.
pub fn run_ledger(
    transfers: &[TaggedTransfer],
    prices: &PriceSeries,
) -> Result<CostBasisLedger, AnalysisError> {
    let mut ledger = CostBasisLedger::new();
    for transfer in transfers {
        let price = prices.price_at(transfer.timestamp)?;
        ledger.apply(transfer, price);
    }
    Ok(ledger)
}

pub fn compute_profit_loss(
    transfers: &[TaggedTransfer],
    prices: &PriceSeries,
) -> Result<ProfitLossResult, AnalysisError> {
    run_ledger(transfers, prices).map(|ledger| ledger.result())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
