//! DailyBar: one trading day as delivered by a market-data provider.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar before it is reduced to a closing-price series.
///
/// Providers fill missing fields with NaN rather than dropping the row, so
/// `PriceSeries::from_bars` decides what survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

impl DailyBar {
    /// Returns true if the closing price is missing or not finite.
    pub fn is_void(&self) -> bool {
        !self.close.is_finite()
    }

    /// Basic OHLC sanity check: high >= low and both bracket the close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.close
            && self.low <= self.close
            && self.close >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 102.0,
            low: 99.0,
            close,
            volume: 1_000,
            adj_close: close,
        }
    }

    #[test]
    fn nan_close_is_void() {
        assert!(bar(f64::NAN).is_void());
        assert!(!bar(101.0).is_void());
    }

    #[test]
    fn close_outside_range_is_not_sane() {
        assert!(bar(101.0).is_sane());
        assert!(!bar(105.0).is_sane());
        assert!(!bar(f64::NAN).is_sane());
    }
}
