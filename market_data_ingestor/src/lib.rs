//! Vendor-agnostic ingestion of exchange market data.
//!
//! The crate defines the canonical [`Bar`](models::bar::Bar) /
//! [`BarSeries`](models::bar_series::BarSeries) models, the async
//! [`DataProvider`](providers::DataProvider) trait, and a Binance REST
//! implementation for daily and intraday klines plus order-book depth
//! snapshots. Provider failures surface through
//! [`ProviderError`](providers::ProviderError).

pub mod models;
pub mod providers;
