//! Calendar bucketing and rollup summaries.
//!
//! Buckets are Sunday-started calendar weeks or calendar months covering the
//! store's requested range, UTC throughout. A bucket day is *eligible* when a
//! bar is present for it; a bucket with zero eligible days yields a summary
//! whose numeric fields are `NaN`, so downstream consumers can tell "no
//! data" from "zero volatility".

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    metrics::MetricsTable,
    store::{BarStore, DailyBar},
};

/// The active view granularity for the calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// A single day's cell.
    Daily,
    /// One Sunday-started week row.
    Weekly,
    /// A full month grid with per-week rollups.
    #[default]
    Monthly,
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Granularity::Daily),
            "weekly" | "week" => Ok(Granularity::Weekly),
            "monthly" | "month" => Ok(Granularity::Monthly),
            other => Err(format!("unknown granularity: {other}")),
        }
    }
}

/// Rollup over one Sunday-started calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekSummary {
    /// The week's Sunday.
    pub week_start: NaiveDate,
    /// Mean volatility over eligible days; a day with an unset volatility
    /// window contributes zero.
    pub avg_volatility: f64,
    /// Total base-asset volume over eligible days.
    pub total_volume: f64,
    /// Mean close over eligible days.
    pub avg_close: f64,
}

impl WeekSummary {
    /// Whether the week had at least one eligible day.
    pub fn has_data(&self) -> bool {
        !self.avg_close.is_nan()
    }
}

/// Rollup over one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthSummary {
    /// Calendar year of the bucket.
    pub year: i32,
    /// Calendar month of the bucket, 1-based.
    pub month: u32,
    /// Mean volatility over eligible days (missing volatility counts as 0).
    pub avg_volatility: f64,
    /// Total base-asset volume over eligible days.
    pub total_volume: f64,
    /// Mean close over eligible days.
    pub avg_close: f64,
    /// `(last.close - first.open) / first.open * 100` over the month's
    /// chronologically first and last eligible days.
    pub performance_pct: f64,
}

impl MonthSummary {
    /// Whether the month had at least one eligible day.
    pub fn has_data(&self) -> bool {
        !self.avg_close.is_nan()
    }
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Summaries for every Sunday-started week touching the store's range.
pub fn week_summaries(store: &BarStore, metrics: &MetricsTable) -> Vec<WeekSummary> {
    let mut summaries = Vec::new();
    let mut start = week_start(store.range_start());
    while start <= store.range_end() {
        summaries.push(summarize_week(start, store, metrics));
        start += Duration::days(7);
    }
    summaries
}

/// Summaries for every calendar month touching the store's range.
pub fn month_summaries(store: &BarStore, metrics: &MetricsTable) -> Vec<MonthSummary> {
    let mut summaries = Vec::new();
    let (mut year, mut month) = (store.range_start().year(), store.range_start().month());
    let last = (store.range_end().year(), store.range_end().month());
    loop {
        summaries.push(summarize_month(year, month, store, metrics));
        if (year, month) == last {
            break;
        }
        (year, month) = next_month(year, month);
    }
    summaries
}

fn summarize_week(start: NaiveDate, store: &BarStore, metrics: &MetricsTable) -> WeekSummary {
    let eligible: Vec<&DailyBar> = (0..7)
        .filter_map(|offset| store.get(start + Duration::days(offset)))
        .collect();

    let (avg_volatility, total_volume, avg_close) = rollup(&eligible, metrics);
    WeekSummary {
        week_start: start,
        avg_volatility,
        total_volume,
        avg_close,
    }
}

fn summarize_month(year: i32, month: u32, store: &BarStore, metrics: &MetricsTable) -> MonthSummary {
    let eligible: Vec<&DailyBar> = store
        .bars()
        .iter()
        .filter(|b| b.date.year() == year && b.date.month() == month)
        .collect();

    let (avg_volatility, total_volume, avg_close) = rollup(&eligible, metrics);

    // Bars are date-ordered, so first/last eligible are positional.
    let performance_pct = match (eligible.first(), eligible.last()) {
        (Some(first), Some(last)) => (last.close - first.open) / first.open * 100.0,
        _ => f64::NAN,
    };

    MonthSummary {
        year,
        month,
        avg_volatility,
        total_volume,
        avg_close,
        performance_pct,
    }
}

fn rollup(eligible: &[&DailyBar], metrics: &MetricsTable) -> (f64, f64, f64) {
    if eligible.is_empty() {
        return (f64::NAN, f64::NAN, f64::NAN);
    }
    let n = eligible.len() as f64;
    let avg_volatility = eligible
        .iter()
        .map(|b| metrics.volatility(b.date).unwrap_or(0.0))
        .sum::<f64>()
        / n;
    let total_volume = eligible.iter().map(|b| b.volume).sum::<f64>();
    let avg_close = eligible.iter().map(|b| b.close).sum::<f64>() / n;
    (avg_volatility, total_volume, avg_close)
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}
