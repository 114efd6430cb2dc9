//! Forecast accuracy metrics: pure functions over forecast/actual pairs.
//!
//! RMSE = sqrt(mean((f - a)^2)), MAE = mean(|f - a|),
//! MAPE = mean(|f - a| / |a|) * 100.
//!
//! MAPE is undefined when an actual value is zero; that is reported as an
//! error instead of letting NaN or infinity leak into the ranking.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MetricError {
    #[error("forecast has {forecast} values but actual has {actual}")]
    LengthMismatch { forecast: usize, actual: usize },

    #[error("cannot score an empty series")]
    Empty,

    #[error("actual value at index {index} is zero; MAPE is undefined")]
    ZeroActual { index: usize },

    #[error("non-finite value at index {index}")]
    NonFinite { index: usize },
}

/// RMSE / MAE / MAPE for one forecast against its actuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    pub rmse: f64,
    pub mae: f64,
    /// Percentage, e.g. 2.5 means 2.5 %.
    pub mape: f64,
    /// Number of forecast/actual pairs scored.
    pub n: usize,
}

/// Score point forecasts against actual values of identical length.
pub fn score(forecast: &[f64], actual: &[f64]) -> Result<AccuracyMetrics, MetricError> {
    if forecast.len() != actual.len() {
        return Err(MetricError::LengthMismatch {
            forecast: forecast.len(),
            actual: actual.len(),
        });
    }
    if actual.is_empty() {
        return Err(MetricError::Empty);
    }

    let mut sq = 0.0;
    let mut abs = 0.0;
    let mut pct = 0.0;

    for (index, (&f, &a)) in forecast.iter().zip(actual).enumerate() {
        if !f.is_finite() || !a.is_finite() {
            return Err(MetricError::NonFinite { index });
        }
        if a == 0.0 {
            return Err(MetricError::ZeroActual { index });
        }
        let err = f - a;
        sq += err * err;
        abs += err.abs();
        pct += err.abs() / a.abs();
    }

    let n = actual.len() as f64;
    Ok(AccuracyMetrics {
        rmse: (sq / n).sqrt(),
        mae: abs / n,
        mape: pct / n * 100.0,
        n: actual.len(),
    })
}

/// Score in-sample fitted values, skipping positions without a fitted value.
///
/// Fitted series carry NaN for warm-up observations that have no one-step
/// prediction; only the defined pairs are scored.
pub fn score_in_sample(actual: &[f64], fitted: &[f64]) -> Result<AccuracyMetrics, MetricError> {
    if fitted.len() != actual.len() {
        return Err(MetricError::LengthMismatch {
            forecast: fitted.len(),
            actual: actual.len(),
        });
    }

    let (f, a): (Vec<f64>, Vec<f64>) = fitted
        .iter()
        .zip(actual)
        .filter(|(f, _)| f.is_finite())
        .map(|(&f, &a)| (f, a))
        .unzip();

    score(&f, &a)
}
