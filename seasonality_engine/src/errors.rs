//! Engine error types.

use chrono::NaiveDate;
use market_data_ingestor::providers::ProviderError;
use thiserror::Error;

/// The unified error type for the analytics engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The upstream market-data source was unreachable or answered non-2xx.
    ///
    /// The affected range presents as an empty data set; the caller may retry
    /// by re-triggering the same load.
    #[error("fetch failed: {source}")]
    Fetch {
        /// The provider-level failure.
        #[from]
        source: ProviderError,
    },

    /// The feed returned two bars for the same calendar day.
    #[error("duplicate bar for {symbol} on {date}")]
    DuplicateDate {
        /// Symbol whose feed is corrupt.
        symbol: String,
        /// The day that appeared twice.
        date: NaiveDate,
    },

    /// Benchmark series length differs from the primary series length.
    ///
    /// Rejects that comparison only; the primary's own metrics are
    /// unaffected.
    #[error("benchmark length {benchmark} does not match primary length {primary}")]
    AlignmentMismatch {
        /// Number of bars in the primary series.
        primary: usize,
        /// Number of bars in the benchmark series.
        benchmark: usize,
    },

    /// Engine configuration could not be parsed or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}
