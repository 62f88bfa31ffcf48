//! Order-book depth snapshot models.
//!
//! Consumed by sibling displays (depth ladders, spread widgets) driven by the
//! same symbol selection as the bar data; the analytics core itself does not
//! read these.

use serde::{Deserialize, Serialize};

/// One resting level of an order book: a price and the quantity quoted at it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub qty: f64,
}

/// A point-in-time order book snapshot for a single symbol.
///
/// Bids are sorted descending by price, asks ascending, as returned by the
/// exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub last_update_id: u64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderBookSnapshot {
    /// The highest-priced bid, if any side data is present.
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids
            .iter()
            .copied()
            .max_by(|a, b| a.price.total_cmp(&b.price))
    }

    /// The lowest-priced ask, if any side data is present.
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks
            .iter()
            .copied()
            .min_by(|a, b| a.price.total_cmp(&b.price))
    }

    /// Whether the book is crossed (best bid at or above best ask).
    ///
    /// A crossed snapshot indicates a stale or inconsistent response and
    /// should not be rendered.
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        }
    }
}
