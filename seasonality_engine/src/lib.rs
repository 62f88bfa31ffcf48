//! Calendar-grade analytics over daily OHLCV bars.
//!
//! The engine turns a flat sequence of daily bars for one symbol into:
//! - per-day rolling volatility, moving averages, and RSI ([`metrics`]),
//! - week- and month-level rollup summaries ([`calendar`]),
//! - benchmark and secondary-period comparison series ([`compare`]),
//! - threshold-based alert events ([`alerts`]),
//! - tabular rows for rendering and export collaborators ([`export`]).
//!
//! All derived computation is a pure, synchronous function of the loaded
//! [`store::BarStore`]; the only suspension point is the upstream fetch,
//! guarded against stale responses by [`session::SessionContext`].

#![deny(missing_docs)]

pub mod alerts;
pub mod calendar;
pub mod compare;
pub mod config;
pub mod errors;
pub mod export;
pub mod metrics;
pub mod session;
pub mod store;
