use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{models::timeframe::TimeFrame, providers::binance_rest::BinanceBarsParams};

/// Universal parameters for requesting time-series bar data from any market data provider.
///
/// This struct is designed to be vendor-agnostic and is the standard input
/// for all [`DataProvider`](crate::providers::DataProvider) implementations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// List of symbols to request (e.g., `["BTCUSDT"]`, `["ETHUSDT", "BNBUSDT"]`).
    pub symbols: Vec<String>,

    /// The time interval for each bar (e.g., 15 minutes, 1 day).
    ///
    /// **Validation of allowed values is performed by each data provider
    /// implementation, according to their own API rules.**
    pub timeframe: TimeFrame,

    /// Start of the requested time range (inclusive, UTC).
    ///
    /// Providers should return bars opening at or after this timestamp.
    pub start: DateTime<Utc>,

    /// End of the requested time range (inclusive, UTC).
    ///
    /// Providers should return bars opening at or before this timestamp.
    pub end: DateTime<Utc>,

    /// Optional, provider-specific parameters.
    #[serde(default)]
    pub provider_specific: ProviderParams,
}

/// An enum to hold provider-specific request parameters.
///
/// This allows callers to specify detailed, per-request options for a
/// particular provider without cluttering the universal `BarsRequestParams`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum ProviderParams {
    #[default]
    None,
    Binance(BinanceBarsParams),
}
