use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{
    bar::Bar,
    depth::{OrderBookSnapshot, PriceLevel},
};

/// One kline record as returned by `GET /api/v3/klines`.
///
/// Binance encodes each kline as a positional JSON array; all decimal fields
/// arrive as strings. Positions: open time (ms), open, high, low, close,
/// volume, close time (ms), quote asset volume, trade count, taker buy base
/// volume, taker buy quote volume, and one unused field.
#[derive(Debug, Deserialize)]
pub struct BinanceKline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    pub String,
    pub u64,
    pub String,
    pub String,
    pub String,
);

impl BinanceKline {
    /// The bar's opening timestamp in epoch milliseconds.
    pub fn open_time_ms(&self) -> i64 {
        self.0
    }

    /// Converts the record into the canonical [`Bar`].
    ///
    /// Returns `None` when a decimal field fails to parse or the open time
    /// is out of range; such records are dropped from the load for that
    /// timestamp only.
    pub fn to_bar(&self) -> Option<Bar> {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(self.0)?;
        Some(Bar {
            timestamp,
            open: self.1.parse().ok()?,
            high: self.2.parse().ok()?,
            low: self.3.parse().ok()?,
            close: self.4.parse().ok()?,
            volume: self.5.parse().ok()?,
            trade_count: Some(self.8),
        })
    }
}

/// Payload of `GET /api/v3/depth`.
///
/// Each side is a list of `["price", "qty"]` string pairs.
#[derive(Debug, Deserialize)]
pub struct BinanceDepth {
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: u64,
    pub bids: Vec<(String, String)>,
    pub asks: Vec<(String, String)>,
}

impl BinanceDepth {
    /// Converts the raw payload into an [`OrderBookSnapshot`], dropping
    /// levels that fail to parse.
    pub fn into_snapshot(self) -> OrderBookSnapshot {
        OrderBookSnapshot {
            last_update_id: self.last_update_id,
            bids: parse_levels(self.bids),
            asks: parse_levels(self.asks),
        }
    }
}

fn parse_levels(raw: Vec<(String, String)>) -> Vec<PriceLevel> {
    raw.into_iter()
        .filter_map(|(price, qty)| {
            Some(PriceLevel {
                price: price.parse().ok()?,
                qty: qty.parse().ok()?,
            })
        })
        .collect()
}
