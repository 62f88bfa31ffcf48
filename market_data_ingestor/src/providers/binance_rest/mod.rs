//! Binance spot REST API provider (`/api/v3/klines`, `/api/v3/depth`).

pub mod params;
pub mod provider;
pub mod response;

pub use params::BinanceBarsParams;
pub use provider::BinanceProvider;
