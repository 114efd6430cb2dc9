//! Criterion benchmarks for the modelling hot paths.
//!
//! Benchmarks:
//! 1. Single CSS fit of a fixed ARIMA(2,1,2) with drift
//! 2. Stepwise automatic selection on five years of daily closes
//! 3. 21-step forecast with 80/95 intervals

use arimalab_core::model::{auto_arima, fit_arima, ArimaSpec, AutoArimaConfig, DEFAULT_LEVELS};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.05 * t + (t * 0.1).sin() * 5.0 + (t * 0.37).cos() * 1.5
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_fit(c: &mut Criterion) {
    let closes = make_closes(1_250);
    let spec = ArimaSpec::new(2, 1, 2, true);
    c.bench_function("fit_arima_212_drift_1250", |b| {
        b.iter(|| fit_arima(black_box(&closes), spec))
    });
}

fn bench_auto(c: &mut Criterion) {
    let closes = make_closes(1_250);
    let config = AutoArimaConfig::default();
    let mut group = c.benchmark_group("auto_arima");
    group.sample_size(10);
    group.bench_function("stepwise_1250", |b| {
        b.iter(|| auto_arima(black_box(&closes), &config))
    });
    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let closes = make_closes(1_250);
    let Ok(fit) = fit_arima(&closes, ArimaSpec::new(2, 1, 2, true)) else {
        return;
    };
    c.bench_function("forecast_21_steps", |b| {
        b.iter(|| fit.forecast(black_box(21), &DEFAULT_LEVELS))
    });
}

criterion_group!(benches, bench_fit, bench_auto, bench_forecast);
criterion_main!(benches);
