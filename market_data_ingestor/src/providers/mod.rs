//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, which serves as a unified interface
//! for fetching time-series bar data and order-book snapshots from any market
//! data vendor.
//!
//! Each concrete provider implementation (such as Binance) should implement
//! [`DataProvider`] to handle vendor-specific API logic and validation.
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
//! for runtime selection of providers.

pub mod binance_rest;
pub mod errors;

pub use errors::{ProviderError, ProviderInitError};

use async_trait::async_trait;

use crate::models::{
    bar_series::BarSeries, depth::OrderBookSnapshot, request_params::BarsRequestParams,
};

#[async_trait]
pub trait DataProvider {
    /// Fetch bar series for every symbol named in `params`.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError>;

    /// Fetch a point-in-time order book snapshot for one symbol, `depth`
    /// levels per side.
    async fn fetch_order_book(
        &self,
        symbol: &str,
        depth: u16,
    ) -> Result<OrderBookSnapshot, ProviderError>;
}
