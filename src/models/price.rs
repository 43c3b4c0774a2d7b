use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily OHLC record of a historical price series. Only the close is
/// used for valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPriceBar {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub close: Decimal,
}

impl DailyPriceBar {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
