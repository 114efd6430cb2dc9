//! Training/test windowing.
//!
//! A series is split by calendar boundaries into a training window (every
//! point on or before `train_end`) and a test window (`test_start..=test_end`).
//! The two never overlap because `train_end < test_start` is checked when the
//! bounds are built.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PriceSeries;

#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("training end {train_end} must be before test start {test_start}")]
    TrainingOverlapsTest {
        train_end: NaiveDate,
        test_start: NaiveDate,
    },

    #[error("test start {test_start} is after test end {test_end}")]
    InvertedTestWindow {
        test_start: NaiveDate,
        test_end: NaiveDate,
    },

    #[error("{symbol}: no observations on or before {train_end}")]
    EmptyTrainingWindow { symbol: String, train_end: NaiveDate },

    #[error("{symbol}: test window {test_start}..={test_end} contains no trading days")]
    EmptyTestWindow {
        symbol: String,
        test_start: NaiveDate,
        test_end: NaiveDate,
    },
}

/// Calendar boundaries of a train/test split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    train_end: NaiveDate,
    test_start: NaiveDate,
    test_end: NaiveDate,
}

impl WindowBounds {
    pub fn new(
        train_end: NaiveDate,
        test_start: NaiveDate,
        test_end: NaiveDate,
    ) -> Result<Self, WindowError> {
        if train_end >= test_start {
            return Err(WindowError::TrainingOverlapsTest {
                train_end,
                test_start,
            });
        }
        if test_start > test_end {
            return Err(WindowError::InvertedTestWindow {
                test_start,
                test_end,
            });
        }
        Ok(Self {
            train_end,
            test_start,
            test_end,
        })
    }

    pub fn train_end(&self) -> NaiveDate {
        self.train_end
    }

    pub fn test_start(&self) -> NaiveDate {
        self.test_start
    }

    pub fn test_end(&self) -> NaiveDate {
        self.test_end
    }
}

/// Result of splitting a series.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSeries {
    pub train: PriceSeries,
    pub test: PriceSeries,
}

/// Split `series` into training and test windows.
///
/// Points strictly between `train_end` and `test_start` belong to neither
/// window. An empty test window is an error rather than a zero-length
/// comparison.
pub fn split(series: &PriceSeries, bounds: &WindowBounds) -> Result<SplitSeries, WindowError> {
    let train = series.up_to(bounds.train_end);
    let test = series.between(bounds.test_start, bounds.test_end);

    if train.is_empty() {
        return Err(WindowError::EmptyTrainingWindow {
            symbol: series.symbol().to_string(),
            train_end: bounds.train_end,
        });
    }
    if test.is_empty() {
        return Err(WindowError::EmptyTestWindow {
            symbol: series.symbol().to_string(),
            test_start: bounds.test_start,
            test_end: bounds.test_end,
        });
    }

    if let (Some(last_train), Some(first_test)) = (train.last_date(), test.first_date()) {
        let gap = (first_test - last_train).num_days();
        tracing::debug!(
            symbol = series.symbol(),
            train = train.len(),
            test = test.len(),
            gap_days = gap,
            "split series"
        );
    }

    Ok(SplitSeries { train, test })
}
