//! Side-by-side comparison of two bar series.
//!
//! Two modes, with deliberately different alignment rules:
//!
//! - **Benchmark**: same calendar dates, different symbol. Pairs are aligned
//!   strictly by index; a length mismatch rejects the comparison (never a
//!   silent truncation) while leaving the primary series untouched.
//! - **Secondary period**: same symbol, different date range. No alignment
//!   is attempted; each series keeps its own date axis and only derived
//!   statistics are meaningfully comparable.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{errors::Error, metrics::MetricsTable, store::BarStore};

/// One index-aligned pair of closes for synchronized charting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkPoint {
    /// Date taken from the primary series' axis.
    pub date: NaiveDate,
    /// Primary close at this index.
    pub primary_close: f64,
    /// Benchmark close at the same index.
    pub benchmark_close: f64,
}

/// An index-aligned benchmark comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkAlignment {
    points: Vec<BenchmarkPoint>,
}

impl BenchmarkAlignment {
    /// The aligned pairs, in the primary series' date order.
    pub fn points(&self) -> &[BenchmarkPoint] {
        &self.points
    }

    /// Benchmark close at a primary index, if within range.
    pub fn benchmark_close_at(&self, index: usize) -> Option<f64> {
        self.points.get(index).map(|p| p.benchmark_close)
    }
}

/// Aligns a benchmark series against the primary by index position.
///
/// The caller must supply equal-length responses over the same dates; a
/// length mismatch is a data error for this comparison only.
pub fn align_benchmark(
    primary: &BarStore,
    benchmark: &BarStore,
) -> Result<BenchmarkAlignment, Error> {
    if primary.len() != benchmark.len() {
        return Err(Error::AlignmentMismatch {
            primary: primary.len(),
            benchmark: benchmark.len(),
        });
    }

    let points = primary
        .bars()
        .iter()
        .zip(benchmark.bars())
        .map(|(p, b)| BenchmarkPoint {
            date: p.date,
            primary_close: p.close,
            benchmark_close: b.close,
        })
        .collect();

    Ok(BenchmarkAlignment { points })
}

/// Derived statistics for one loaded period.
///
/// Fields are `NaN` for an empty series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    /// Number of bars in the period.
    pub bars: usize,
    /// Mean close over the period.
    pub avg_close: f64,
    /// Mean volatility over the period (unset windows count as 0).
    pub avg_volatility: f64,
    /// Total base-asset volume.
    pub total_volume: f64,
    /// `(last.close - first.open) / first.open * 100` over the whole period.
    pub performance_pct: f64,
}

impl SeriesStats {
    /// Computes period statistics from a store and its metric table.
    pub fn compute(store: &BarStore, metrics: &MetricsTable) -> Self {
        let bars = store.bars();
        if bars.is_empty() {
            return Self {
                bars: 0,
                avg_close: f64::NAN,
                avg_volatility: f64::NAN,
                total_volume: f64::NAN,
                performance_pct: f64::NAN,
            };
        }

        let n = bars.len() as f64;
        let avg_close = bars.iter().map(|b| b.close).sum::<f64>() / n;
        let avg_volatility = bars
            .iter()
            .map(|b| metrics.volatility(b.date).unwrap_or(0.0))
            .sum::<f64>()
            / n;
        let total_volume = bars.iter().map(|b| b.volume).sum::<f64>();
        let first = &bars[0];
        let last = &bars[bars.len() - 1];
        let performance_pct = (last.close - first.open) / first.open * 100.0;

        Self {
            bars: bars.len(),
            avg_close,
            avg_volatility,
            total_volume,
            performance_pct,
        }
    }
}

/// Statistics for a primary period next to a user-chosen secondary period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodComparison {
    /// Statistics of the primary period.
    pub primary: SeriesStats,
    /// Statistics of the secondary period.
    pub secondary: SeriesStats,
}

/// Pairs the derived statistics of two independently loaded periods.
pub fn compare_periods(
    primary: (&BarStore, &MetricsTable),
    secondary: (&BarStore, &MetricsTable),
) -> PeriodComparison {
    PeriodComparison {
        primary: SeriesStats::compute(primary.0, primary.1),
        secondary: SeriesStats::compute(secondary.0, secondary.1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DailyBar;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn store(symbol: &str, closes: &[f64]) -> BarStore {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| DailyBar {
                date: date(i as u32 + 1),
                open: 100.0,
                high: close.max(100.0),
                low: close.min(100.0),
                close,
                volume: 10.0,
            })
            .collect();
        BarStore::from_bars(symbol, date(1), date(closes.len() as u32), bars).unwrap()
    }

    #[test]
    fn benchmark_pairs_align_by_index() {
        let primary = store("ETHUSDT", &[101.0, 102.0, 103.0]);
        let benchmark = store("BTCUSDT", &[201.0, 202.0, 203.0]);

        let aligned = align_benchmark(&primary, &benchmark).unwrap();
        assert_eq!(aligned.points().len(), 3);
        assert_eq!(aligned.points()[1].date, date(2));
        assert_eq!(aligned.points()[1].primary_close, 102.0);
        assert_eq!(aligned.points()[1].benchmark_close, 202.0);
        assert_eq!(aligned.benchmark_close_at(2), Some(203.0));
        assert_eq!(aligned.benchmark_close_at(3), None);
    }

    #[test]
    fn length_mismatch_is_rejected_not_truncated() {
        let primary = store("ETHUSDT", &[101.0, 102.0, 103.0]);
        let benchmark = store("BTCUSDT", &[201.0, 202.0]);

        let err = align_benchmark(&primary, &benchmark).unwrap_err();
        assert!(matches!(
            err,
            Error::AlignmentMismatch {
                primary: 3,
                benchmark: 2
            }
        ));
    }

    #[test]
    fn period_stats_cover_first_open_to_last_close() {
        let primary = store("ETHUSDT", &[101.0, 102.0, 110.0]);
        let metrics = MetricsTable::compute(&primary);
        let stats = SeriesStats::compute(&primary, &metrics);

        assert_eq!(stats.bars, 3);
        assert!((stats.performance_pct - 10.0).abs() < 1e-12);
        assert_eq!(stats.total_volume, 30.0);
    }

    #[test]
    fn period_comparison_keeps_each_series_on_its_own_axis() {
        // Different lengths are fine here: no alignment is attempted, only
        // the derived statistics sit side by side.
        let primary = store("BTCUSDT", &[101.0, 102.0, 110.0]);
        let secondary = store("BTCUSDT", &[99.0, 95.0]);
        let primary_metrics = MetricsTable::compute(&primary);
        let secondary_metrics = MetricsTable::compute(&secondary);

        let comparison = compare_periods(
            (&primary, &primary_metrics),
            (&secondary, &secondary_metrics),
        );
        assert_eq!(comparison.primary.bars, 3);
        assert_eq!(comparison.secondary.bars, 2);
        assert!((comparison.secondary.performance_pct - (-5.0)).abs() < 1e-12);
    }

    #[test]
    fn empty_period_stats_are_nan() {
        let empty = BarStore::empty("ETHUSDT", date(1), date(5));
        let metrics = MetricsTable::compute(&empty);
        let stats = SeriesStats::compute(&empty, &metrics);
        assert_eq!(stats.bars, 0);
        assert!(stats.avg_close.is_nan());
        assert!(stats.performance_pct.is_nan());
    }
}
