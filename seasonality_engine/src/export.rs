//! Tabular output for rendering and export collaborators.
//!
//! The engine only produces these rows; CSV/PNG/PDF writers live outside it.
//! Absent metrics stay `None` so writers can render an empty field, never a
//! `0`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    compare::BenchmarkAlignment,
    metrics::{MetricsTable, RollingMetric},
    store::{BarStore, DailyBar},
};

/// One export row per bar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExportRow {
    /// The UTC calendar day.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Highest price of the day.
    pub high: f64,
    /// Lowest price of the day.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Base-asset volume.
    pub volume: f64,
    /// Rolling volatility, when the window is satisfied.
    pub volatility: Option<f64>,
    /// 5-bar moving average, when the window is satisfied.
    pub ma5: Option<f64>,
    /// 10-bar moving average, when the window is satisfied.
    pub ma10: Option<f64>,
    /// RSI(14), when the window is satisfied.
    pub rsi14: Option<f64>,
    /// Benchmark close aligned by index, when a benchmark was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_close: Option<f64>,
}

/// Per-date lookup used for rendering a single calendar cell.
#[derive(Debug, Clone, Copy)]
pub struct DaySnapshot<'a> {
    /// The day's bar, when one is present.
    pub bar: Option<&'a DailyBar>,
    /// The day's rolling metrics, when a bar is present.
    pub metric: Option<&'a RollingMetric>,
}

/// Builds one row per bar, in date order.
pub fn export_rows(
    store: &BarStore,
    metrics: &MetricsTable,
    benchmark: Option<&BenchmarkAlignment>,
) -> Vec<ExportRow> {
    store
        .bars()
        .iter()
        .enumerate()
        .map(|(index, bar)| {
            let metric = metrics.get(bar.date).copied().unwrap_or_default();
            ExportRow {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                volatility: metric.volatility,
                ma5: metric.ma5,
                ma10: metric.ma10,
                rsi14: metric.rsi14,
                benchmark_close: benchmark.and_then(|a| a.benchmark_close_at(index)),
            }
        })
        .collect()
}

/// Looks up one calendar day for rendering.
pub fn day_snapshot<'a>(
    store: &'a BarStore,
    metrics: &'a MetricsTable,
    date: NaiveDate,
) -> DaySnapshot<'a> {
    DaySnapshot {
        bar: store.get(date),
        metric: metrics.get(date),
    }
}
