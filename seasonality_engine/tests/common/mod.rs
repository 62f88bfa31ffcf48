use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use market_data_ingestor::{
    models::{
        bar::Bar, bar_series::BarSeries, depth::OrderBookSnapshot,
        request_params::BarsRequestParams, timeframe::TimeFrame,
    },
    providers::{DataProvider, ProviderError},
};

/// Serves canned daily series for whichever symbols it was seeded with.
pub struct CannedProvider {
    pub series: Vec<BarSeries>,
}

#[async_trait]
impl DataProvider for CannedProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        Ok(self
            .series
            .iter()
            .filter(|s| params.symbols.contains(&s.symbol))
            .cloned()
            .collect())
    }

    async fn fetch_order_book(
        &self,
        _symbol: &str,
        _depth: u16,
    ) -> Result<OrderBookSnapshot, ProviderError> {
        Ok(OrderBookSnapshot {
            last_update_id: 0,
            bids: vec![],
            asks: vec![],
        })
    }
}

/// A provider whose upstream is always down.
pub struct DownProvider;

#[async_trait]
impl DataProvider for DownProvider {
    async fn fetch_bars(
        &self,
        _params: BarsRequestParams,
    ) -> Result<Vec<BarSeries>, ProviderError> {
        Err(ProviderError::Api("503 service unavailable".to_string()))
    }

    async fn fetch_order_book(
        &self,
        _symbol: &str,
        _depth: u16,
    ) -> Result<OrderBookSnapshot, ProviderError> {
        Err(ProviderError::Api("503 service unavailable".to_string()))
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
}

/// Builds a daily series of consecutive calendar days starting at `first_day`.
pub fn daily_series(
    symbol: &str,
    first_day: NaiveDate,
    opens: &[f64],
    closes: &[f64],
) -> BarSeries {
    let bars = opens
        .iter()
        .zip(closes)
        .enumerate()
        .map(|(i, (&open, &close))| Bar {
            timestamp: (first_day + Duration::days(i as i64))
                .and_time(NaiveTime::MIN)
                .and_utc(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 1000.0,
            trade_count: Some(10),
        })
        .collect();

    BarSeries {
        symbol: symbol.to_string(),
        timeframe: TimeFrame::daily(),
        bars,
    }
}
