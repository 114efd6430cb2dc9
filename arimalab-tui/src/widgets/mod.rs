//! Chart and table widgets
//!
//! - PriceChart: raw closing-price history
//! - ForecastChart: training tail, actual test closes, forecast and interval band
//! - MetricsChart: grouped RMSE / MAE / MAPE bars per symbol
//! - RankingTable: MAPE ranking plus failed symbols

pub mod forecast_chart;
pub mod metrics_chart;
pub mod price_chart;
pub mod ranking_table;

pub use forecast_chart::ForecastChart;
pub use metrics_chart::MetricsChart;
pub use price_chart::PriceChart;
pub use ranking_table::RankingTable;

/// Min/max of `values` padded by 5 % of the range, ignoring non-finite values.
pub(crate) fn padded_bounds(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let range = max - min;
    let pad = if range > 0.0 { range * 0.05 } else { min.abs().max(1.0) * 0.05 };
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_five_percent_of_range() {
        let (lo, hi) = padded_bounds([100.0, 120.0, 110.0]);
        assert!((lo - 99.0).abs() < 1e-12);
        assert!((hi - 121.0).abs() < 1e-12);
    }

    #[test]
    fn flat_and_empty_inputs_have_width() {
        let (lo, hi) = padded_bounds([50.0, 50.0]);
        assert!(lo < 50.0 && hi > 50.0);
        assert_eq!(padded_bounds(Vec::<f64>::new()), (0.0, 1.0));
        let (lo, hi) = padded_bounds([f64::NAN, 10.0, 20.0]);
        assert!(lo < 10.0 && hi > 20.0);
    }
}
