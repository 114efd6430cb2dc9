//! ArimaLab Core: price series, data providers, windowing, ARIMA modelling and scoring.
//!
//! This crate contains everything needed to evaluate one symbol:
//! - Domain types (daily bars, validated price series)
//! - Price providers (Yahoo Finance, CSV import, synthetic walks, in-memory)
//! - Calendar train/test windowing
//! - ARIMA estimation, automatic order selection and interval forecasts
//! - Coefficient significance tests
//! - Forecast accuracy metrics (RMSE, MAE, MAPE)

pub mod data;
pub mod domain;
pub mod metrics;
pub mod model;
pub mod window;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types crossing the batch worker boundary are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::DailyBar>();
        require_sync::<domain::DailyBar>();
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();

        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::CsvProvider>();
        require_sync::<data::CsvProvider>();
        require_send::<data::InMemoryProvider>();
        require_sync::<data::InMemoryProvider>();

        require_send::<window::WindowBounds>();
        require_sync::<window::WindowBounds>();

        require_send::<model::ArimaFit>();
        require_sync::<model::ArimaFit>();
        require_send::<model::Forecast>();
        require_sync::<model::Forecast>();
        require_send::<model::AutoArimaConfig>();
        require_sync::<model::AutoArimaConfig>();
        require_send::<model::ModelError>();
        require_sync::<model::ModelError>();

        require_send::<metrics::AccuracyMetrics>();
        require_sync::<metrics::AccuracyMetrics>();
    }

    /// Providers are usable as trait objects shared across threads.
    #[test]
    fn provider_trait_is_object_safe() {
        fn _check(provider: &dyn data::PriceProvider) -> &str {
            provider.name()
        }
        let provider = data::InMemoryProvider::new();
        assert_eq!(_check(&provider), "in_memory");
    }
}
