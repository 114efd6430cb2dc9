//! Property tests for batch ranking.
//!
//! 1. Ranked output is sorted by MAPE and is a permutation of the input
//! 2. Equal MAPE values keep their input order

use arimalab_runner::{rank_by_mape, AccuracyRecord};
use proptest::prelude::*;

fn arb_records() -> impl Strategy<Value = Vec<AccuracyRecord>> {
    prop::collection::vec(0u32..20, 0..30).prop_map(|mapes| {
        mapes
            .into_iter()
            .enumerate()
            .map(|(i, m)| AccuracyRecord {
                symbol: format!("S{i}"),
                rmse: m as f64 * 2.0,
                mae: m as f64,
                // Coarse values so ties are common
                mape: m as f64 / 4.0,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn ranking_is_sorted_permutation(records in arb_records()) {
        let ranked = rank_by_mape(records.clone());
        prop_assert_eq!(ranked.len(), records.len());
        prop_assert!(ranked.windows(2).all(|w| w[0].mape <= w[1].mape));
        for (i, e) in ranked.iter().enumerate() {
            prop_assert_eq!(e.rank, i + 1);
        }
        let mut a: Vec<_> = records.iter().map(|r| r.symbol.clone()).collect();
        let mut b: Vec<_> = ranked.iter().map(|e| e.symbol.clone()).collect();
        a.sort();
        b.sort();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn ties_preserve_input_order(records in arb_records()) {
        let position = |symbol: &str| {
            records.iter().position(|r| r.symbol == symbol).unwrap()
        };
        let ranked = rank_by_mape(records.clone());
        for w in ranked.windows(2) {
            if w[0].mape == w[1].mape {
                prop_assert!(position(&w[0].symbol) < position(&w[1].symbol));
            }
        }
    }
}
