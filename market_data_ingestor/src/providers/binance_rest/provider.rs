use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::Client;
use shared_utils::env::env_var_or;

use crate::{
    models::{
        bar::Bar, bar_series::BarSeries, depth::OrderBookSnapshot,
        request_params::BarsRequestParams,
    },
    providers::{
        DataProvider, ProviderError, ProviderInitError,
        binance_rest::{
            params::{construct_params, interval_str, page_limit},
            response::{BinanceDepth, BinanceKline},
        },
    },
};

const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Environment variable overriding the REST base URL (regional mirrors,
/// test servers).
const BASE_URL_ENV: &str = "BINANCE_BASE_URL";

pub struct BinanceProvider {
    client: Client,
    base_url: String,
}

impl BinanceProvider {
    /// Creates a new Binance market-data provider.
    ///
    /// Market-data endpoints are public; no API key is required.
    pub fn new() -> Result<Self, ProviderInitError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: env_var_or(BASE_URL_ENV, DEFAULT_BASE_URL),
        })
    }

    /// Creates a provider against an explicit base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderInitError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl DataProvider for BinanceProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        // Validate the timeframe before touching the network.
        let interval = interval_str(&params.timeframe)?;
        let limit = page_limit(&params);
        let url = format!("{}/api/v3/klines", self.base_url);

        let mut all_bars: IndexMap<String, Vec<Bar>> = IndexMap::new();

        for symbol in &params.symbols {
            let mut window_start = params.start.timestamp_millis();

            loop {
                let query = construct_params(&params, symbol, interval, window_start);
                let response = self.client.get(&url).query(&query).send().await?;

                if !response.status().is_success() {
                    let error_msg = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown API error".to_string());
                    return Err(ProviderError::Api(error_msg));
                }

                let klines = response.json::<Vec<BinanceKline>>().await?;
                let page_len = klines.len();
                let last_open_time = klines.last().map(BinanceKline::open_time_ms);

                // Records with unparseable fields are dropped for that
                // timestamp only; the rest of the page still loads.
                all_bars
                    .entry(symbol.to_uppercase())
                    .or_default()
                    .extend(klines.iter().filter_map(BinanceKline::to_bar));

                // A short page means the requested window is exhausted.
                match last_open_time {
                    Some(ts) if page_len as u32 == limit => window_start = ts + 1,
                    _ => break,
                }
            }
        }

        let result = all_bars
            .into_iter()
            .map(|(symbol, bars)| BarSeries {
                symbol,
                timeframe: params.timeframe.clone(),
                bars,
            })
            .collect();

        Ok(result)
    }

    async fn fetch_order_book(
        &self,
        symbol: &str,
        depth: u16,
    ) -> Result<OrderBookSnapshot, ProviderError> {
        let url = format!("{}/api/v3/depth", self.base_url);
        let query = [
            ("symbol".to_string(), symbol.to_uppercase()),
            ("limit".to_string(), depth.to_string()),
        ];

        let response = self.client.get(&url).query(&query).send().await?;
        if !response.status().is_success() {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(ProviderError::Api(error_msg));
        }

        let payload = response.json::<BinanceDepth>().await?;
        Ok(payload.into_snapshot())
    }
}
