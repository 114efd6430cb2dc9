//! Single-symbol pipeline: fetch → window → fit → forecast → score.
//!
//! `run_symbol` is pure with respect to everything but the provider: it owns
//! no state across calls, so the batch runner can evaluate symbols in any
//! order (or in parallel) and still assemble identical reports.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use arimalab_core::data::{DataError, DataSource, PriceProvider};
use arimalab_core::domain::{PricePoint, PriceSeries, SeriesError};
use arimalab_core::metrics::{score, score_in_sample, AccuracyMetrics, MetricError};
use arimalab_core::model::{
    auto_arima, significance_table, ArimaSpec, AutoArimaConfig, CoefficientRow, ModelError,
    SignificanceError,
};
use arimalab_core::window::{split, WindowBounds, WindowError};

use crate::config::{ConfigError, ReportConfig};

/// Pipeline stage at which a symbol failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Window,
    Fit,
    Forecast,
    Score,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "fetch",
            Self::Window => "window",
            Self::Fit => "fit",
            Self::Forecast => "forecast",
            Self::Score => "score",
        })
    }
}

/// Underlying cause of a stage failure.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Significance(#[from] SignificanceError),
    #[error(transparent)]
    Metric(#[from] MetricError),
}

/// A symbol's pipeline failure: which symbol, which stage, and why.
#[derive(Debug, Error)]
#[error("{symbol}: {stage} stage failed: {source}")]
pub struct PipelineError {
    pub symbol: String,
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl PipelineError {
    fn at(symbol: &str, stage: Stage) -> impl FnOnce(StageError) -> Self + '_ {
        move |source| Self {
            symbol: symbol.to_string(),
            stage,
            source,
        }
    }
}

/// Everything `run_symbol` needs besides the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub bounds: WindowBounds,
    pub fetch_start: NaiveDate,
    pub model: AutoArimaConfig,
    pub interval_levels: Vec<f64>,
}

impl PipelineOptions {
    pub fn from_config(config: &ReportConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let fetch_start = config.fetch_start().ok_or_else(|| {
            ConfigError::Invalid("lookback start date is out of range".into())
        })?;
        Ok(Self {
            bounds: config.window_bounds()?,
            fetch_start,
            model: config.auto_arima(),
            interval_levels: config.model.interval_levels.clone(),
        })
    }
}

/// Selected model and its fit statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub spec: ArimaSpec,
    /// Human-readable label, e.g. "ARIMA(1,1,0) with drift".
    pub label: String,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub aicc: f64,
    pub bic: f64,
    pub candidates_tried: usize,
}

/// Interval bounds at one coverage level for one forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalBound {
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

/// One test-window day: actual close against the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub actual: f64,
    pub forecast: f64,
    pub intervals: Vec<IntervalBound>,
}

/// Full result of one symbol's pipeline pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub source: DataSource,
    pub dataset_hash: String,
    /// Every close fetched, training and test windows included.
    pub history: Vec<PricePoint>,
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    pub n_train: usize,
    pub model: ModelSummary,
    pub coefficients: Vec<CoefficientRow>,
    /// In-sample one-step predictions aligned with the training window.
    pub fitted: Vec<Option<f64>>,
    pub forecast: Vec<ForecastRow>,
    pub test_metrics: AccuracyMetrics,
    /// `None` when in-sample accuracy is undefined, e.g. a zero close in training.
    pub train_metrics: Option<AccuracyMetrics>,
}

impl SymbolReport {
    pub fn mape(&self) -> f64 {
        self.test_metrics.mape
    }

    /// Levels present on every forecast row, in configured order.
    pub fn interval_levels(&self) -> Vec<f64> {
        self.forecast
            .first()
            .map(|row| row.intervals.iter().map(|b| b.level).collect())
            .unwrap_or_default()
    }
}

/// Run the full pipeline for one symbol.
pub fn run_symbol(
    provider: &dyn PriceProvider,
    symbol: &str,
    options: &PipelineOptions,
) -> Result<SymbolReport, PipelineError> {
    let fail = |stage| PipelineError::at(symbol, stage);

    // Fetch
    let fetched = provider
        .fetch(symbol, options.fetch_start, options.bounds.test_end())
        .map_err(StageError::from)
        .map_err(fail(Stage::Fetch))?;
    let series = PriceSeries::from_bars(symbol, &fetched.bars)
        .map_err(StageError::from)
        .map_err(fail(Stage::Fetch))?;

    // Window
    let windows = split(&series, &options.bounds)
        .map_err(StageError::from)
        .map_err(fail(Stage::Window))?;
    let train = windows.train.closes();
    let actual = windows.test.closes();

    // Fit
    let selected = auto_arima(&train, &options.model)
        .map_err(StageError::from)
        .map_err(fail(Stage::Fit))?;
    let fit = &selected.model;
    let coefficients = significance_table(fit)
        .map_err(StageError::from)
        .map_err(fail(Stage::Fit))?;

    // Forecast
    let forecast = fit
        .forecast(actual.len(), &options.interval_levels)
        .map_err(StageError::from)
        .map_err(fail(Stage::Forecast))?;

    // Score
    let test_metrics = score(&forecast.mean, &actual)
        .map_err(StageError::from)
        .map_err(fail(Stage::Score))?;
    let train_metrics = match score_in_sample(&train, fit.fitted()) {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            tracing::warn!(%symbol, error = %e, "in-sample accuracy undefined");
            None
        }
    };

    let rows = windows
        .test
        .points()
        .iter()
        .enumerate()
        .map(|(h, point)| ForecastRow {
            date: point.date,
            actual: point.close,
            forecast: forecast.mean[h],
            intervals: forecast
                .intervals
                .iter()
                .map(|pi| IntervalBound {
                    level: pi.level,
                    lower: pi.lower[h],
                    upper: pi.upper[h],
                })
                .collect(),
        })
        .collect();

    let spec = fit.spec();
    tracing::info!(
        %symbol,
        model = %spec,
        rmse = test_metrics.rmse,
        mae = test_metrics.mae,
        mape = test_metrics.mape,
        "symbol complete"
    );

    Ok(SymbolReport {
        symbol: symbol.to_string(),
        source: fetched.source,
        dataset_hash: series.dataset_hash(),
        history: series.points().to_vec(),
        train_start: windows.train.first_date().unwrap_or(options.fetch_start),
        train_end: windows.train.last_date().unwrap_or(options.bounds.train_end()),
        n_train: train.len(),
        model: ModelSummary {
            spec,
            label: spec.to_string(),
            sigma2: fit.sigma2(),
            log_likelihood: fit.log_likelihood(),
            aic: fit.aic(),
            aicc: fit.aicc(),
            bic: fit.bic(),
            candidates_tried: selected.candidates.len(),
        },
        coefficients,
        fitted: fit
            .fitted()
            .iter()
            .map(|v| v.is_finite().then_some(*v))
            .collect(),
        forecast: rows,
        test_metrics,
        train_metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arimalab_core::data::InMemoryProvider;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn options() -> PipelineOptions {
        PipelineOptions {
            bounds: WindowBounds::new(d(2024, 9, 30), d(2024, 10, 1), d(2024, 10, 31)).unwrap(),
            fetch_start: d(2023, 1, 1),
            model: AutoArimaConfig::default(),
            interval_levels: vec![80.0, 95.0],
        }
    }

    #[test]
    fn unknown_symbol_fails_at_fetch() {
        let provider = InMemoryProvider::new();
        let err = run_symbol(&provider, "NOPE", &options()).unwrap_err();
        assert_eq!(err.symbol, "NOPE");
        assert_eq!(err.stage, Stage::Fetch);
        assert!(matches!(err.source, StageError::Data(DataError::SymbolNotFound { .. })));
        assert!(err.to_string().starts_with("NOPE: fetch stage failed"));
    }

    #[test]
    fn constant_series_fails_at_fit() {
        let provider = InMemoryProvider::new().with_closes("FLAT", d(2023, 1, 2), &[50.0; 500]);
        let err = run_symbol(&provider, "FLAT", &options()).unwrap_err();
        assert_eq!(err.stage, Stage::Fit);
        assert!(matches!(
            err.source,
            StageError::Model(ModelError::DegenerateSeries(_))
        ));
    }

    #[test]
    fn data_ending_before_test_window_fails_at_window() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let provider = InMemoryProvider::new().with_closes("OLD", d(2023, 1, 2), &closes);
        let err = run_symbol(&provider, "OLD", &options()).unwrap_err();
        assert_eq!(err.stage, Stage::Window);
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                100.0 + 0.02 * t + 4.0 * (t * 0.05).sin() + (t * 0.7).sin()
            })
            .collect()
    }

    #[test]
    fn zero_close_in_test_window_fails_at_score() {
        let mut bars = arimalab_core::data::weekday_bars(d(2023, 1, 2), &wave(500));
        for bar in bars.iter_mut().filter(|b| b.date == d(2024, 10, 15)) {
            bar.close = 0.0;
        }
        let provider = InMemoryProvider::new().with_bars("ZERO", bars);
        let err = run_symbol(&provider, "ZERO", &options()).unwrap_err();
        assert_eq!(err.stage, Stage::Score);
        // 2024-10-15 is the eleventh weekday of October
        assert!(matches!(
            err.source,
            StageError::Metric(MetricError::ZeroActual { index: 10 })
        ));
    }

    #[test]
    fn zero_close_in_training_only_drops_in_sample_metrics() {
        let mut bars = arimalab_core::data::weekday_bars(d(2023, 1, 2), &wave(500));
        for bar in bars.iter_mut().filter(|b| b.date == d(2024, 3, 12)) {
            bar.close = 0.0;
        }
        let provider = InMemoryProvider::new().with_bars("GAP", bars);
        let report = run_symbol(&provider, "GAP", &options()).unwrap();
        assert!(report.train_metrics.is_none());
        assert_eq!(report.test_metrics.n, 23);
    }

    #[test]
    fn clean_series_reports_in_sample_metrics() {
        let provider = InMemoryProvider::new().with_closes("OK", d(2023, 1, 2), &wave(500));
        let report = run_symbol(&provider, "OK", &options()).unwrap();
        let train = report.train_metrics.unwrap();
        assert!(train.rmse >= train.mae);
    }

    #[test]
    fn stage_names_are_lowercase() {
        assert_eq!(Stage::Forecast.to_string(), "forecast");
        assert_eq!(serde_json::to_string(&Stage::Score).unwrap(), "\"score\"");
    }
}
