//! Rolling per-day metrics: volatility, moving averages, and RSI.
//!
//! Every metric is computed over a trailing window of contiguous existing
//! bars ending at the metric's date, and is absent (`None`) whenever that
//! window is not fully covered. Absence is never encoded as a numeric
//! sentinel, so "no data" stays distinguishable from a genuine zero.

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::store::{BarStore, DailyBar};

/// Trailing bar count for the return-volatility window.
pub const VOLATILITY_WINDOW: usize = 5;
/// Trailing bar count for the short moving average.
pub const MA_SHORT_WINDOW: usize = 5;
/// Trailing bar count for the long moving average.
pub const MA_LONG_WINDOW: usize = 10;
/// Day-over-day difference count for the relative strength index.
pub const RSI_PERIOD: usize = 14;

/// Rolling metrics attached to one bar's date.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RollingMetric {
    /// Population standard deviation of the trailing 5 simple returns.
    pub volatility: Option<f64>,
    /// Arithmetic mean of the trailing 5 closes.
    pub ma5: Option<f64>,
    /// Arithmetic mean of the trailing 10 closes.
    pub ma10: Option<f64>,
    /// Relative strength index over 14 day-over-day close differences,
    /// bounded to `[0, 100]`.
    pub rsi14: Option<f64>,
}

/// Per-date metric table for one bar store, in the store's date order.
///
/// A pure function of the store: recomputing from unchanged bars yields a
/// bit-identical table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsTable {
    by_date: IndexMap<NaiveDate, RollingMetric>,
}

impl MetricsTable {
    /// Computes the full table for every date in the store.
    pub fn compute(store: &BarStore) -> Self {
        let bars = store.bars();
        let n = bars.len();

        // Day-over-day close differences split into gain and loss series;
        // difference index d sits between bar d and bar d+1.
        let mut gains = Vec::with_capacity(n.saturating_sub(1));
        let mut losses = Vec::with_capacity(n.saturating_sub(1));
        for pair in bars.windows(2) {
            let diff = pair[1].close - pair[0].close;
            gains.push(diff.max(0.0));
            losses.push((-diff).max(0.0));
        }

        let mut by_date = IndexMap::with_capacity(n);
        for (i, bar) in bars.iter().enumerate() {
            by_date.insert(
                bar.date,
                RollingMetric {
                    volatility: volatility_at(bars, i),
                    ma5: trailing_close_mean(bars, i, MA_SHORT_WINDOW),
                    ma10: trailing_close_mean(bars, i, MA_LONG_WINDOW),
                    rsi14: rsi_at(&gains, &losses, i),
                },
            );
        }

        Self { by_date }
    }

    /// The metric record for a date, if the store held a bar there.
    pub fn get(&self, date: NaiveDate) -> Option<&RollingMetric> {
        self.by_date.get(&date)
    }

    /// Shorthand for the volatility value at a date.
    pub fn volatility(&self, date: NaiveDate) -> Option<f64> {
        self.by_date.get(&date).and_then(|m| m.volatility)
    }

    /// Iterates records in the store's date order.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &RollingMetric)> {
        self.by_date.iter()
    }

    /// Number of dated records.
    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

fn volatility_at(bars: &[DailyBar], i: usize) -> Option<f64> {
    if i + 1 < VOLATILITY_WINDOW {
        return None;
    }
    let window = &bars[i + 1 - VOLATILITY_WINDOW..=i];
    let returns: Vec<f64> = window.iter().map(DailyBar::simple_return).collect();
    Some(population_std_dev(&returns))
}

fn trailing_close_mean(bars: &[DailyBar], i: usize, window: usize) -> Option<f64> {
    if i + 1 < window {
        return None;
    }
    let slice = &bars[i + 1 - window..=i];
    Some(slice.iter().map(|b| b.close).sum::<f64>() / window as f64)
}

/// RSI for the bar at series index `i`, averaging the 14 gain and loss
/// values ending at difference index `i - 1`. The average is the simple
/// 14-period mean, not Wilder's smoothed form. `RS` is pinned to 100 when
/// the average loss is zero, so an all-flat series reads just under 100
/// rather than dividing by zero.
fn rsi_at(gains: &[f64], losses: &[f64], i: usize) -> Option<f64> {
    if i < RSI_PERIOD {
        return None;
    }
    let avg_gain = gains[i - RSI_PERIOD..i].iter().sum::<f64>() / RSI_PERIOD as f64;
    let avg_loss = losses[i - RSI_PERIOD..i].iter().sum::<f64>() / RSI_PERIOD as f64;
    let rs = if avg_loss == 0.0 {
        100.0
    } else {
        avg_gain / avg_loss
    };
    Some(100.0 - 100.0 / (1.0 + rs))
}

fn population_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BarStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn store_from(opens: &[f64], closes: &[f64]) -> BarStore {
        let bars = opens
            .iter()
            .zip(closes)
            .enumerate()
            .map(|(i, (&open, &close))| DailyBar {
                date: day(i as u32 + 1),
                open,
                high: open.max(close),
                low: open.min(close),
                close,
                volume: 1000.0,
            })
            .collect();
        BarStore::from_bars("BTCUSDT", day(1), day(opens.len() as u32), bars).unwrap()
    }

    fn flat_store(len: u32) -> BarStore {
        let prices = vec![100.0; len as usize];
        store_from(&prices, &prices)
    }

    #[test]
    fn short_series_has_no_windowed_metrics() {
        let table = MetricsTable::compute(&flat_store(4));
        for (_, m) in table.iter() {
            assert_eq!(m.volatility, None);
            assert_eq!(m.ma5, None);
            assert_eq!(m.ma10, None);
            assert_eq!(m.rsi14, None);
        }
    }

    #[test]
    fn windows_open_at_exact_lengths() {
        let table = MetricsTable::compute(&flat_store(15));

        assert!(table.get(day(4)).unwrap().volatility.is_none());
        assert!(table.get(day(5)).unwrap().volatility.is_some());
        assert!(table.get(day(5)).unwrap().ma5.is_some());

        assert!(table.get(day(9)).unwrap().ma10.is_none());
        assert!(table.get(day(10)).unwrap().ma10.is_some());

        assert!(table.get(day(14)).unwrap().rsi14.is_none());
        assert!(table.get(day(15)).unwrap().rsi14.is_some());
    }

    #[test]
    fn flat_series_rsi_uses_the_pinned_rs_convention() {
        // Gains and losses are all zero, so avg_loss == 0 pins RS to 100 and
        // RSI lands at 100 - 100/101, not at 50.
        let table = MetricsTable::compute(&flat_store(20));
        let rsi = table.get(day(20)).unwrap().rsi14.unwrap();
        assert!((rsi - (100.0 - 100.0 / 101.0)).abs() < 1e-12);
    }

    #[test]
    fn rsi_is_zero_for_monotonic_losses() {
        let closes: Vec<f64> = (0..20).map(|i| 200.0 - i as f64).collect();
        let opens = closes.clone();
        let table = MetricsTable::compute(&store_from(&opens, &closes));
        let rsi = table.get(day(20)).unwrap().rsi14.unwrap();
        assert!(rsi.abs() < 1e-12);
    }

    #[test]
    fn ma5_matches_hand_computed_mean() {
        let opens = [100.0, 101.0, 100.0, 102.0, 104.0, 103.0];
        let closes = [100.0, 102.0, 101.0, 105.0, 103.0, 108.0];
        let table = MetricsTable::compute(&store_from(&opens, &closes));

        let ma5 = table.get(day(5)).unwrap().ma5.unwrap();
        assert!((ma5 - 102.2).abs() < 1e-12);
    }

    #[test]
    fn volatility_is_population_std_dev_of_simple_returns() {
        let opens = [100.0, 101.0, 100.0, 102.0, 104.0, 103.0];
        let closes = [100.0, 102.0, 101.0, 105.0, 103.0, 108.0];
        let table = MetricsTable::compute(&store_from(&opens, &closes));

        let returns = [
            0.0,
            1.0 / 101.0,
            1.0 / 100.0,
            3.0 / 102.0,
            -1.0 / 104.0,
        ];
        let expected = population_std_dev(&returns);

        let got = table.get(day(5)).unwrap().volatility.unwrap();
        assert!((got - expected).abs() < 1e-15);
    }

    #[test]
    fn recompute_is_bit_identical() {
        let opens = [100.0, 101.0, 100.0, 102.0, 104.0, 103.0];
        let closes = [100.0, 102.0, 101.0, 105.0, 103.0, 108.0];
        let store = store_from(&opens, &closes);

        let first = MetricsTable::compute(&store);
        let second = MetricsTable::compute(&store);
        assert_eq!(first, second);
    }

    #[test]
    fn every_metric_date_has_a_bar() {
        let opens = [100.0, 101.0, 100.0];
        let closes = [100.0, 102.0, 101.0];
        let store = store_from(&opens, &closes);
        let table = MetricsTable::compute(&store);
        for (date, _) in table.iter() {
            assert!(store.get(*date).is_some());
        }
    }
}
