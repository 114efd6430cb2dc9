//! PriceSeries: an ordered sequence of (date, closing price) observations.
//!
//! Invariants enforced at construction:
//! - dates are strictly increasing (no duplicates, no reordering)
//! - every price is finite and non-negative
//!
//! Gaps are allowed: weekends and market holidays are simply absent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::DailyBar;

/// Errors raised when a series would violate its invariants.
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("dates must be strictly increasing: {next} follows {prev}")]
    NotIncreasing { prev: NaiveDate, next: NaiveDate },

    #[error("negative closing price {price} on {date}")]
    NegativePrice { date: NaiveDate, price: f64 },

    #[error("non-finite closing price on {date}")]
    NonFinitePrice { date: NaiveDate },
}

/// A single closing-price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Closing prices for one symbol, one point per trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from points that are already in date order.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for p in &points {
            if !p.close.is_finite() {
                return Err(SeriesError::NonFinitePrice { date: p.date });
            }
            if p.close < 0.0 {
                return Err(SeriesError::NegativePrice {
                    date: p.date,
                    price: p.close,
                });
            }
        }
        for w in points.windows(2) {
            if w[1].date <= w[0].date {
                return Err(SeriesError::NotIncreasing {
                    prev: w[0].date,
                    next: w[1].date,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            points,
        })
    }

    /// Reduce provider bars to a closing-price series.
    ///
    /// Bars are sorted by date, duplicate dates keep the first occurrence and
    /// bars without a finite close are dropped. A negative close is an error.
    pub fn from_bars(symbol: impl Into<String>, bars: &[DailyBar]) -> Result<Self, SeriesError> {
        let mut sorted: Vec<&DailyBar> = bars.iter().filter(|b| !b.is_void()).collect();
        sorted.sort_by_key(|b| b.date);
        sorted.dedup_by_key(|b| b.date);

        let dropped = bars.len() - sorted.len();
        if dropped > 0 {
            tracing::debug!(dropped, "dropped void or duplicate bars");
        }

        let points = sorted
            .into_iter()
            .map(|b| PricePoint::new(b.date, b.close))
            .collect();
        Self::new(symbol, points)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Sub-series with `start <= date <= end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        self.filtered(|d| d >= start && d <= end)
    }

    /// Sub-series with `date <= end`.
    pub fn up_to(&self, end: NaiveDate) -> PriceSeries {
        self.filtered(|d| d <= end)
    }

    fn filtered(&self, keep: impl Fn(NaiveDate) -> bool) -> PriceSeries {
        PriceSeries {
            symbol: self.symbol.clone(),
            points: self
                .points
                .iter()
                .filter(|p| keep(p.date))
                .copied()
                .collect(),
        }
    }

    /// Deterministic BLAKE3 hash over symbol, dates and prices.
    pub fn dataset_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol.as_bytes());
        for p in &self.points {
            hasher.update(p.date.to_string().as_bytes());
            hasher.update(&p.close.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}
