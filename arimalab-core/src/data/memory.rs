//! In-memory provider backed by a symbol → bars map.
//!
//! Used by tests and by callers that already hold data. Symbols can be
//! registered as failing to exercise per-symbol error isolation.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::provider::{check_range, DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::DailyBar;

#[derive(Debug, Default)]
pub struct InMemoryProvider {
    bars: HashMap<String, Vec<DailyBar>>,
    unreachable: Vec<String>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bars for a symbol (replaces any previous entry).
    pub fn with_bars(mut self, symbol: impl Into<String>, bars: Vec<DailyBar>) -> Self {
        self.bars.insert(symbol.into(), bars);
        self
    }

    /// Register a symbol whose fetch fails as if the network were down.
    pub fn with_unreachable(mut self, symbol: impl Into<String>) -> Self {
        self.unreachable.push(symbol.into());
        self
    }

    /// Register a closing-price series on consecutive weekdays from `start`.
    pub fn with_closes(self, symbol: impl Into<String>, start: NaiveDate, closes: &[f64]) -> Self {
        self.with_bars(symbol, weekday_bars(start, closes))
    }
}

impl PriceProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        check_range(start, end)?;

        if self.unreachable.iter().any(|s| s == symbol) {
            return Err(DataError::NetworkUnreachable(format!(
                "{symbol}: provider unreachable"
            )));
        }

        let all = self
            .bars
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;

        let bars: Vec<DailyBar> = all
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();

        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::InMemory,
        })
    }
}

/// Lay closes out on consecutive weekdays starting at (or after) `start`.
pub fn weekday_bars(start: NaiveDate, closes: &[f64]) -> Vec<DailyBar> {
    use chrono::{Datelike, Weekday};

    let mut bars = Vec::with_capacity(closes.len());
    let mut date = start;
    for &close in closes {
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date += chrono::Duration::days(1);
        }
        bars.push(DailyBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
            adj_close: close,
        });
        date += chrono::Duration::days(1);
    }
    bars
}
