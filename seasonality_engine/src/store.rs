//! The Bar Store: ordered daily bars for one symbol over a date span.
//!
//! The store is rebuilt wholesale whenever the requested symbol or range
//! changes; every derived structure in this crate is a pure function of its
//! contents.

use chrono::{Duration, NaiveDate, NaiveTime};
use market_data_ingestor::{
    models::{
        bar::Bar, bar_series::BarSeries, request_params::BarsRequestParams, timeframe::TimeFrame,
    },
    providers::DataProvider,
};
use tracing::warn;

use crate::errors::Error;

/// One calendar day's OHLCV for a symbol.
///
/// Prices are positive and finite, volume non-negative and finite; records
/// violating this never enter a [`BarStore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyBar {
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
    /// Base-asset volume traded.
    pub volume: f64,
}

impl DailyBar {
    /// The day's simple return, `(close - open) / open`.
    pub fn simple_return(&self) -> f64 {
        (self.close - self.open) / self.open
    }

    /// The day's performance in percent, `(close - open) / open * 100`.
    pub fn performance_pct(&self) -> f64 {
        self.simple_return() * 100.0
    }

    fn is_well_formed(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
            && self.open > 0.0
            && self.high > 0.0
            && self.low > 0.0
            && self.close > 0.0
            && self.high >= self.low
            && self.volume >= 0.0
    }
}

/// Ordered collection of [`DailyBar`]s for one symbol over a requested range.
///
/// Bars are unique per date and sorted ascending; missing trading days are
/// simply absent, never zero-filled. The requested range is remembered so
/// calendar buckets can cover days without data.
#[derive(Debug, Clone, PartialEq)]
pub struct BarStore {
    symbol: String,
    range_start: NaiveDate,
    range_end: NaiveDate,
    bars: Vec<DailyBar>,
}

impl BarStore {
    /// An empty store for the given selection, used before the first load
    /// completes and after a failed one.
    pub fn empty(symbol: &str, range_start: NaiveDate, range_end: NaiveDate) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            range_start,
            range_end,
            bars: Vec::new(),
        }
    }

    /// Builds a store from raw daily bars.
    ///
    /// Bars are sorted ascending by date. Malformed records (non-positive or
    /// non-finite prices, negative volume) are dropped for that date only;
    /// duplicate dates reject the whole load as a data error.
    pub fn from_bars(
        symbol: &str,
        range_start: NaiveDate,
        range_end: NaiveDate,
        bars: Vec<DailyBar>,
    ) -> Result<Self, Error> {
        let symbol = symbol.trim().to_uppercase();

        let mut kept: Vec<DailyBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            if bar.is_well_formed() {
                kept.push(bar);
            } else {
                warn!(symbol = %symbol, date = %bar.date, "dropping malformed bar");
            }
        }
        kept.sort_by_key(|b| b.date);

        for pair in kept.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(Error::DuplicateDate {
                    symbol,
                    date: pair[0].date,
                });
            }
        }

        Ok(Self {
            symbol,
            range_start,
            range_end,
            bars: kept,
        })
    }

    /// Builds a store from a provider's [`BarSeries`], truncating each bar's
    /// opening timestamp to its UTC calendar day.
    pub fn from_series(
        series: &BarSeries,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Self, Error> {
        let bars = series.bars.iter().map(daily_from_bar).collect();
        Self::from_bars(&series.symbol, range_start, range_end, bars)
    }

    /// Loads daily bars for `symbol` over the inclusive date range.
    ///
    /// An unreachable or erroring upstream surfaces as [`Error::Fetch`]; the
    /// caller is expected to present an empty data set for the range and may
    /// retry by re-triggering the same load. A response that simply contains
    /// no series for the symbol yields an empty store.
    pub async fn load(
        provider: &dyn DataProvider,
        symbol: &str,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Self, Error> {
        let symbol = symbol.trim().to_uppercase();
        let params = BarsRequestParams {
            symbols: vec![symbol.clone()],
            timeframe: TimeFrame::daily(),
            start: range_start.and_time(NaiveTime::MIN).and_utc(),
            // Inclusive end: one millisecond before the next UTC midnight.
            end: (range_end + Duration::days(1)).and_time(NaiveTime::MIN).and_utc()
                - Duration::milliseconds(1),
            provider_specific: Default::default(),
        };

        let series_set = provider.fetch_bars(params).await?;
        match series_set.iter().find(|s| s.symbol == symbol) {
            Some(series) => Self::from_series(series, range_start, range_end),
            None => Ok(Self::empty(&symbol, range_start, range_end)),
        }
    }

    /// The symbol this store holds bars for.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Start of the requested range (inclusive).
    pub fn range_start(&self) -> NaiveDate {
        self.range_start
    }

    /// End of the requested range (inclusive).
    pub fn range_end(&self) -> NaiveDate {
        self.range_end
    }

    /// All bars, ascending by date.
    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    /// The bar for a calendar day, if one is present.
    pub fn get(&self, date: NaiveDate) -> Option<&DailyBar> {
        self.bars
            .binary_search_by_key(&date, |b| b.date)
            .ok()
            .map(|i| &self.bars[i])
    }

    /// Number of bars held.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the store holds no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The earliest bar, if any.
    pub fn first_bar(&self) -> Option<&DailyBar> {
        self.bars.first()
    }

    /// The latest bar, if any.
    pub fn last_bar(&self) -> Option<&DailyBar> {
        self.bars.last()
    }
}

fn daily_from_bar(bar: &Bar) -> DailyBar {
    DailyBar {
        date: bar.timestamp.date_naive(),
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume: bar.volume,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn bar(date: NaiveDate, open: f64, close: f64) -> DailyBar {
        DailyBar {
            date,
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn bars_are_sorted_and_looked_up_by_date() {
        let store = BarStore::from_bars(
            "btcusdt",
            day(1),
            day(5),
            vec![bar(day(3), 10.0, 11.0), bar(day(1), 9.0, 10.0)],
        )
        .unwrap();

        assert_eq!(store.symbol(), "BTCUSDT");
        assert_eq!(store.bars()[0].date, day(1));
        assert_eq!(store.get(day(3)).unwrap().close, 11.0);
        assert!(store.get(day(2)).is_none());
    }

    #[test]
    fn duplicate_dates_reject_the_load() {
        let err = BarStore::from_bars(
            "BTCUSDT",
            day(1),
            day(5),
            vec![bar(day(2), 10.0, 11.0), bar(day(2), 11.0, 12.0)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateDate { date, .. } if date == day(2)));
    }

    #[test]
    fn malformed_bars_are_dropped_not_fatal() {
        let mut bad = bar(day(2), 10.0, 11.0);
        bad.open = -1.0;
        let store = BarStore::from_bars(
            "BTCUSDT",
            day(1),
            day(5),
            vec![bar(day(1), 9.0, 10.0), bad, bar(day(3), 11.0, 12.0)],
        )
        .unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.get(day(2)).is_none());
    }

    #[test]
    fn nan_prices_are_malformed() {
        let mut bad = bar(day(1), 10.0, 11.0);
        bad.close = f64::NAN;
        let store = BarStore::from_bars("BTCUSDT", day(1), day(5), vec![bad]).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn performance_pct_matches_definition() {
        let b = bar(day(1), 100.0, 103.0);
        assert!((b.performance_pct() - 3.0).abs() < 1e-12);
    }
}
