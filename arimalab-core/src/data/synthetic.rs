//! Synthetic provider: deterministic random walks for offline runs.
//!
//! Each symbol gets its own RNG seeded from a BLAKE3 hash of the symbol, so
//! repeated runs see identical series. Weekends are skipped; holidays are not
//! modelled.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{check_range, DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::DailyBar;

/// Generates geometric random-walk bars starting at `start_price`.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    start_price: f64,
    daily_vol: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            daily_vol: 0.015,
        }
    }
}

impl SyntheticProvider {
    pub fn new(start_price: f64, daily_vol: f64) -> Self {
        Self {
            start_price,
            daily_vol,
        }
    }

    fn generate(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<DailyBar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut bars = Vec::new();
        let mut price = self.start_price;
        let mut current = start;

        while current <= end {
            let weekday = current.weekday();
            if weekday != Weekday::Sat && weekday != Weekday::Sun {
                let daily_return: f64 = rng.gen_range(-self.daily_vol..=self.daily_vol);
                let open = price;
                let close = price * (1.0 + daily_return);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
                let volume = rng.gen_range(500_000..5_000_000u64);

                bars.push(DailyBar {
                    date: current,
                    open,
                    high,
                    low,
                    close,
                    volume,
                    adj_close: close,
                });
                price = close;
            }
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }

        bars
    }
}

impl PriceProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        check_range(start, end)?;
        tracing::warn!(%symbol, "generating synthetic data");

        let bars = self.generate(symbol, start, end);
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
            source: DataSource::Synthetic,
        })
    }
}
