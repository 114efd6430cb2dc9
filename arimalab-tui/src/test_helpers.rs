//! Test helpers for building symbol reports without running a fit

use arimalab_core::data::DataSource;
use arimalab_core::domain::PricePoint;
use arimalab_core::metrics::AccuracyMetrics;
use arimalab_core::model::{ArimaSpec, CoefficientRow};
use arimalab_runner::{
    BatchReport, ForecastRow, IntervalBound, ModelSummary, RankedEntry, SymbolReport,
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

fn weekdays(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(n);
    let mut current = start;
    while dates.len() < n {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(current);
        }
        current += Duration::days(1);
    }
    dates
}

/// 80 training closes through 2024-09-30 and 5 forecast days in October.
pub fn sample_report(symbol: &str, mape: f64) -> SymbolReport {
    let train_dates = weekdays(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(), 80);
    let train_end = *train_dates.last().unwrap();
    let test_dates = weekdays(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(), 5);

    let mut history: Vec<PricePoint> = train_dates
        .iter()
        .enumerate()
        .map(|(i, d)| PricePoint::new(*d, 100.0 + i as f64 * 0.5))
        .collect();

    let forecast: Vec<ForecastRow> = test_dates
        .iter()
        .enumerate()
        .map(|(h, d)| {
            let mean = 140.0 + h as f64 * 0.5;
            let width = 2.0 * (h as f64 + 1.0).sqrt();
            ForecastRow {
                date: *d,
                actual: mean + 1.0,
                forecast: mean,
                intervals: vec![
                    IntervalBound { level: 80.0, lower: mean - width, upper: mean + width },
                    IntervalBound {
                        level: 95.0,
                        lower: mean - 1.5 * width,
                        upper: mean + 1.5 * width,
                    },
                ],
            }
        })
        .collect();
    history.extend(forecast.iter().map(|r| PricePoint::new(r.date, r.actual)));

    let spec = ArimaSpec::new(1, 1, 0, true);
    SymbolReport {
        symbol: symbol.to_string(),
        source: DataSource::InMemory,
        dataset_hash: "0".repeat(64),
        history,
        train_start: train_dates[0],
        train_end,
        n_train: train_dates.len(),
        model: ModelSummary {
            spec,
            label: spec.to_string(),
            sigma2: 1.2,
            log_likelihood: -120.0,
            aic: 246.0,
            aicc: 246.3,
            bic: 253.1,
            candidates_tried: 9,
        },
        coefficients: vec![CoefficientRow {
            name: "ar1".into(),
            estimate: 0.1,
            std_error: Some(0.05),
            t_statistic: Some(2.0),
            p_value: Some(0.049),
        }],
        fitted: vec![None; train_dates.len()],
        forecast,
        test_metrics: AccuracyMetrics { rmse: mape * 2.0, mae: mape * 1.5, mape, n: 5 },
        train_metrics: Some(AccuracyMetrics { rmse: 1.0, mae: 0.8, mape: 0.6, n: 79 }),
    }
}

/// A batch of ranked sample reports, MAPE ascending in the given order.
pub fn sample_batch(symbols: &[(&str, f64)]) -> BatchReport {
    let reports: Vec<SymbolReport> = symbols.iter().map(|(s, m)| sample_report(s, *m)).collect();
    let ranked = reports
        .iter()
        .enumerate()
        .map(|(i, r)| RankedEntry {
            rank: i + 1,
            symbol: r.symbol.clone(),
            rmse: r.test_metrics.rmse,
            mae: r.test_metrics.mae,
            mape: r.test_metrics.mape,
        })
        .collect();
    BatchReport {
        ranked,
        failures: Vec::new(),
        reports,
    }
}
