use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::errors::AnalysisError;
use crate::models::DailyPriceBar;

/// Daily close prices of one token, ordered by bar start date.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    identifier: String,
    bars: Vec<DailyPriceBar>,
}

impl PriceSeries {
    /// Bars are stably sorted by start date, so bars sharing a start keep
    /// their provider order.
    pub fn new(identifier: impl Into<String>, mut bars: Vec<DailyPriceBar>) -> Self {
        bars.sort_by_key(|b| b.start_date);
        Self {
            identifier: identifier.into(),
            bars,
        }
    }

    /// Close price for the UTC calendar day of `timestamp`.
    pub fn price_at(&self, timestamp: DateTime<Utc>) -> Result<Decimal, AnalysisError> {
        self.price_on(timestamp.date_naive())
    }

    /// Close price for `date`:
    /// - the bar whose `[start, end]` contains the date,
    /// - else the first close when the date precedes the series,
    /// - else the last close when the date follows the series,
    /// - else (gap) the bar whose start is the fewest days away, earliest
    ///   bar on ties.
    pub fn price_on(&self, date: NaiveDate) -> Result<Decimal, AnalysisError> {
        let (first, last) = match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(AnalysisError::NoData(format!(
                    "empty price series for {}",
                    self.identifier
                )))
            }
        };

        if let Some(bar) = self.bars.iter().find(|b| b.contains(date)) {
            return Ok(bar.close);
        }

        if date < first.start_date {
            return Ok(first.close);
        }

        if date > last.end_date {
            return Ok(last.close);
        }

        // min_by_key keeps the first of equally distant bars
        let closest = self
            .bars
            .iter()
            .min_by_key(|b| day_distance(b.start_date, date))
            .unwrap_or(first);

        Ok(closest.close)
    }
}

fn day_distance(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
