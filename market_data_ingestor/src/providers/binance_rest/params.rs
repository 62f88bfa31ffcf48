use serde::{Deserialize, Serialize};

use crate::{
    models::{
        request_params::{BarsRequestParams, ProviderParams},
        timeframe::{TimeFrame, TimeFrameUnit},
    },
    providers::errors::ProviderError,
};

/// Largest page size Binance accepts for a klines request.
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Binance-specific parameters for a bars request.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct BinanceBarsParams {
    /// Page size for each klines request, capped at [`MAX_PAGE_LIMIT`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Maps a universal [`TimeFrame`] onto a Binance kline interval string.
///
/// Binance only understands a fixed interval menu; anything else is a
/// validation error rather than a silent approximation.
pub fn interval_str(timeframe: &TimeFrame) -> Result<&'static str, ProviderError> {
    match (timeframe.amount, &timeframe.unit) {
        (1, TimeFrameUnit::Minute) => Ok("1m"),
        (5, TimeFrameUnit::Minute) => Ok("5m"),
        (15, TimeFrameUnit::Minute) => Ok("15m"),
        (30, TimeFrameUnit::Minute) => Ok("30m"),
        (1, TimeFrameUnit::Hour) => Ok("1h"),
        (4, TimeFrameUnit::Hour) => Ok("4h"),
        (1, TimeFrameUnit::Day) => Ok("1d"),
        (1, TimeFrameUnit::Week) => Ok("1w"),
        (1, TimeFrameUnit::Month) => Ok("1M"),
        (amount, unit) => Err(ProviderError::Validation(format!(
            "unsupported Binance interval: {amount} {unit:?}"
        ))),
    }
}

/// Effective page size for the request.
pub fn page_limit(params: &BarsRequestParams) -> u32 {
    let requested = match &params.provider_specific {
        ProviderParams::Binance(p) => p.limit.unwrap_or(MAX_PAGE_LIMIT),
        ProviderParams::None => MAX_PAGE_LIMIT,
    };
    requested.min(MAX_PAGE_LIMIT)
}

/// Builds the query string for one symbol's klines page.
///
/// `window_start_ms` advances past the last received open time when the
/// previous page came back full.
pub fn construct_params(
    params: &BarsRequestParams,
    symbol: &str,
    interval: &str,
    window_start_ms: i64,
) -> Vec<(String, String)> {
    vec![
        ("symbol".to_string(), symbol.to_uppercase()),
        ("interval".to_string(), interval.to_string()),
        ("startTime".to_string(), window_start_ms.to_string()),
        (
            "endTime".to_string(),
            params.end.timestamp_millis().to_string(),
        ),
        ("limit".to_string(), page_limit(params).to_string()),
    ]
}
