//! Property tests for windowing, scoring and differencing invariants.
//!
//! Uses proptest to verify:
//! 1. Window disjointness: no date lands in both training and test windows
//! 2. Metric ordering: RMSE >= MAE >= 0 for every forecast/actual pair
//! 3. Differencing: integrating the differences of a path restores it
//! 4. Significance: t = estimate / std_error and p lies in [0, 1]

use arimalab_core::domain::{PricePoint, PriceSeries};
use arimalab_core::metrics::{score, MetricError};
use arimalab_core::model::{difference, integrate, t_test};
use arimalab_core::window::{split, WindowBounds};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_series() -> impl Strategy<Value = PriceSeries> {
    prop::collection::vec(arb_price(), 10..120).prop_map(|closes| {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes
            .into_iter()
            .enumerate()
            .map(|(i, c)| PricePoint::new(base + Duration::days(i as i64), c))
            .collect();
        PriceSeries::new("PROP", points).unwrap()
    })
}

fn arb_pairs() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((arb_price(), arb_price()), 1..60)
        .prop_map(|pairs| pairs.into_iter().unzip())
}

// ── 1. Window Disjointness ───────────────────────────────────────────

proptest! {
    /// Every training date precedes every test date, and both windows
    /// respect their calendar bounds.
    #[test]
    fn windows_are_disjoint_and_bounded(
        series in arb_series(),
        train_len in 1i64..60,
        gap in 1i64..5,
        test_len in 0i64..30,
    ) {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let train_end = base + Duration::days(train_len);
        let test_start = train_end + Duration::days(gap);
        let test_end = test_start + Duration::days(test_len);
        let bounds = WindowBounds::new(train_end, test_start, test_end).unwrap();

        if let Ok(s) = split(&series, &bounds) {
            let last_train = s.train.last_date().unwrap();
            let first_test = s.test.first_date().unwrap();
            prop_assert!(last_train < first_test);
            prop_assert!(last_train <= train_end);
            prop_assert!(s.test.points().iter().all(|p| p.date >= test_start && p.date <= test_end));
            prop_assert!(s.train.len() + s.test.len() <= series.len());
        }
    }

    /// Bounds that would overlap are always rejected.
    #[test]
    fn overlapping_bounds_rejected(offset in 0i64..30) {
        let train_end = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let test_start = train_end - Duration::days(offset);
        prop_assert!(WindowBounds::new(train_end, test_start, train_end + Duration::days(10)).is_err());
    }
}

// ── 2. Metric Ordering ───────────────────────────────────────────────

proptest! {
    #[test]
    fn rmse_dominates_mae((forecast, actual) in arb_pairs()) {
        let m = score(&forecast, &actual).unwrap();
        prop_assert!(m.mae >= 0.0);
        prop_assert!(m.rmse + 1e-9 >= m.mae);
        prop_assert!(m.mape >= 0.0);
        prop_assert_eq!(m.n, actual.len());
    }

    #[test]
    fn any_zero_actual_is_rejected((forecast, mut actual) in arb_pairs(), idx in 0usize..60) {
        let idx = idx % actual.len();
        actual[idx] = 0.0;
        let first_zero = actual.iter().position(|a| *a == 0.0).unwrap();
        prop_assert_eq!(score(&forecast, &actual), Err(MetricError::ZeroActual { index: first_zero }));
    }

    #[test]
    fn metrics_scale_with_errors(actual in prop::collection::vec(arb_price(), 1..40), k in 0.01..10.0_f64) {
        let forecast: Vec<f64> = actual.iter().map(|a| a + k).collect();
        let m = score(&forecast, &actual).unwrap();
        prop_assert!((m.mae - k).abs() < 1e-6);
        prop_assert!((m.rmse - k).abs() < 1e-6);
    }
}

// ── 3. Differencing ──────────────────────────────────────────────────

proptest! {
    /// Splitting a path, differencing the tail and integrating it back
    /// from the head reproduces the tail.
    #[test]
    fn integrate_inverts_difference(
        path in prop::collection::vec(arb_price(), 8..50),
        d in 0usize..3,
        split_at in 3usize..6,
    ) {
        let head = &path[..split_at];
        let tail_diffs = difference(&path, d)[(split_at - d)..].to_vec();
        let restored = integrate(&tail_diffs, head, d);
        prop_assert_eq!(restored.len(), path.len() - split_at);
        for (r, p) in restored.iter().zip(&path[split_at..]) {
            prop_assert!((r - p).abs() < 1e-6, "restored {} vs {}", r, p);
        }
    }
}

// ── 4. Significance ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn t_statistic_and_p_value_are_well_formed(
        estimate in -5.0..5.0_f64,
        se in 0.001..2.0_f64,
        df in 1usize..500,
    ) {
        let t = t_test("coef", estimate, se, df).unwrap();
        prop_assert_eq!(t.t_statistic, estimate / se);
        prop_assert!((0.0..=1.0).contains(&t.p_value));
    }
}
