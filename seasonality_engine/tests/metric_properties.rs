use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use seasonality_engine::{
    metrics::MetricsTable,
    store::{BarStore, DailyBar},
};

fn build_store(prices: &[(f64, f64)]) -> BarStore {
    let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let bars: Vec<DailyBar> = prices
        .iter()
        .enumerate()
        .map(|(i, &(open, close))| DailyBar {
            date: first + Duration::days(i as i64),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 1.0,
        })
        .collect();
    let last = first + Duration::days(prices.len() as i64 - 1);
    BarStore::from_bars("BTCUSDT", first, last, bars).unwrap()
}

proptest! {
    #[test]
    fn rsi_stays_within_bounds(
        prices in prop::collection::vec((1.0f64..1000.0, 1.0f64..1000.0), 15..40)
    ) {
        let store = build_store(&prices);
        let table = MetricsTable::compute(&store);
        for (_, metric) in table.iter() {
            if let Some(rsi) = metric.rsi14 {
                prop_assert!((0.0..=100.0).contains(&rsi), "rsi out of bounds: {rsi}");
            }
        }
    }

    #[test]
    fn volatility_is_never_negative(
        prices in prop::collection::vec((1.0f64..1000.0, 1.0f64..1000.0), 5..30)
    ) {
        let store = build_store(&prices);
        let table = MetricsTable::compute(&store);
        for (_, metric) in table.iter() {
            if let Some(vol) = metric.volatility {
                prop_assert!(vol >= 0.0);
            }
        }
    }

    #[test]
    fn recompute_is_idempotent(
        prices in prop::collection::vec((1.0f64..1000.0, 1.0f64..1000.0), 1..30)
    ) {
        let store = build_store(&prices);
        prop_assert_eq!(MetricsTable::compute(&store), MetricsTable::compute(&store));
    }
}
