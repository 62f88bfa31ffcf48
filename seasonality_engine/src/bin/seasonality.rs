use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use market_data_ingestor::{
    models::{
        request_params::BarsRequestParams,
        timeframe::{TimeFrame, TimeFrameUnit},
    },
    providers::{DataProvider, binance_rest::BinanceProvider},
};
use seasonality_engine::{
    calendar::{self, Granularity},
    compare,
    config::{self, EngineConfig},
    metrics::MetricsTable,
    session::SessionContext,
    store::BarStore,
};

#[derive(Parser)]
#[command(version, about = "Calendar analytics over daily OHLCV bars")]
struct Cli {
    /// Path to an engine config file (TOML); flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print per-day export rows over a date range
    Dump {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// Load the benchmark symbol too and append its close column
        #[arg(long)]
        with_benchmark: bool,
    },

    /// Print week or month rollup summaries over a date range
    Summaries {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        granularity: Option<Granularity>,
    },

    /// Compare a secondary period's derived statistics with the primary range
    Compare {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        secondary_start: NaiveDate,
        #[arg(long)]
        secondary_end: NaiveDate,
    },

    /// Evaluate alert thresholds over a date range
    Alerts {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        volatility_threshold: Option<f64>,
        #[arg(long)]
        performance_threshold: Option<f64>,
    },

    /// Print 15-minute bars for one day
    Intraday {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        date: NaiveDate,
    },

    /// Print an order-book snapshot
    Depth {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long, default_value = "10")]
        levels: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let provider = BinanceProvider::new()?;

    match cli.cmd {
        Cmd::Dump {
            symbol,
            start,
            end,
            with_benchmark,
        } => {
            let cfg = resolve_config(&cli.config, symbol)?;
            let mut session = SessionContext::from_config(&cfg, start, end);
            session.refresh(&provider).await?;

            let alignment = if with_benchmark {
                let benchmark = BarStore::load(&provider, &cfg.benchmark, start, end).await?;
                Some(compare::align_benchmark(session.store(), &benchmark)?)
            } else {
                None
            };

            println!("Date,Open,High,Low,Close,Volume,MA5,MA10,RSI,Volatility,BenchmarkClose");
            for row in session.export_rows(alignment.as_ref()) {
                println!(
                    "{},{},{},{},{},{},{},{},{},{},{}",
                    row.date,
                    row.open,
                    row.high,
                    row.low,
                    row.close,
                    row.volume,
                    opt(row.ma5, 2),
                    opt(row.ma10, 2),
                    opt(row.rsi14, 2),
                    opt(row.volatility, 4),
                    opt(row.benchmark_close, 2),
                );
            }
        }

        Cmd::Summaries {
            symbol,
            start,
            end,
            granularity,
        } => {
            let cfg = resolve_config(&cli.config, symbol)?;
            let mut session = SessionContext::from_config(&cfg, start, end);
            if let Some(granularity) = granularity {
                session.set_granularity(granularity);
            }
            session.refresh(&provider).await?;

            match session.granularity() {
                Granularity::Weekly => {
                    for week in calendar::week_summaries(session.store(), session.metrics()) {
                        println!(
                            "week of {}: avg vol {:.4}, total volume {:.2}, avg close {:.2}",
                            week.week_start, week.avg_volatility, week.total_volume, week.avg_close
                        );
                    }
                }
                Granularity::Monthly => {
                    for month in calendar::month_summaries(session.store(), session.metrics()) {
                        println!(
                            "{}-{:02}: avg vol {:.4}, total volume {:.2}, avg close {:.2}, performance {:.2}%",
                            month.year,
                            month.month,
                            month.avg_volatility,
                            month.total_volume,
                            month.avg_close,
                            month.performance_pct
                        );
                    }
                }
                Granularity::Daily => {
                    for row in session.export_rows(None) {
                        println!(
                            "{}: close {:.2}, vol {}, ma5 {}",
                            row.date,
                            row.close,
                            opt(row.volatility, 4),
                            opt(row.ma5, 2)
                        );
                    }
                }
            }
        }

        Cmd::Compare {
            symbol,
            start,
            end,
            secondary_start,
            secondary_end,
        } => {
            let cfg = resolve_config(&cli.config, symbol)?;
            let primary = BarStore::load(&provider, &cfg.symbol, start, end).await?;
            let secondary =
                BarStore::load(&provider, &cfg.symbol, secondary_start, secondary_end).await?;
            let primary_metrics = MetricsTable::compute(&primary);
            let secondary_metrics = MetricsTable::compute(&secondary);

            let comparison = compare::compare_periods(
                (&primary, &primary_metrics),
                (&secondary, &secondary_metrics),
            );
            print_stats("primary", &comparison.primary);
            print_stats("secondary", &comparison.secondary);
        }

        Cmd::Alerts {
            symbol,
            start,
            end,
            volatility_threshold,
            performance_threshold,
        } => {
            let cfg = resolve_config(&cli.config, symbol)?;
            let mut session = SessionContext::from_config(&cfg, start, end);
            if volatility_threshold.is_some() || performance_threshold.is_some() {
                session.add_rule(volatility_threshold, performance_threshold, start);
            }
            let events = session.refresh(&provider).await?;

            for event in &events {
                println!(
                    "{}: rule {:?} fired (volatility {}, performance {})",
                    event.date,
                    event.rule.id,
                    opt(event.observed_volatility, 4),
                    opt(event.observed_performance_pct, 2),
                );
            }
            println!("{} alert(s) over {} bar(s)", events.len(), session.store().len());
        }

        Cmd::Intraday { symbol, date } => {
            let cfg = resolve_config(&cli.config, symbol)?;
            let start = date.and_time(NaiveTime::MIN).and_utc();
            let end = start + chrono::Duration::days(1) - chrono::Duration::milliseconds(1);
            let params = BarsRequestParams {
                symbols: vec![cfg.symbol.clone()],
                timeframe: TimeFrame::new(15, TimeFrameUnit::Minute),
                start,
                end,
                provider_specific: Default::default(),
            };

            for series in provider.fetch_bars(params).await? {
                for bar in &series.bars {
                    println!(
                        "{}: high {:.2}, low {:.2}, volume {:.4}",
                        bar.timestamp.format("%H:%M"),
                        bar.high,
                        bar.low,
                        bar.volume
                    );
                }
            }
        }

        Cmd::Depth { symbol, levels } => {
            let cfg = resolve_config(&cli.config, symbol)?;
            let book = provider.fetch_order_book(&cfg.symbol, levels).await?;
            if book.is_crossed() {
                eprintln!("warning: snapshot is crossed, skipping render");
                return Ok(());
            }
            println!("update id {}", book.last_update_id);
            for level in &book.asks {
                println!("ask {:>12.2} x {:.5}", level.price, level.qty);
            }
            for level in &book.bids {
                println!("bid {:>12.2} x {:.5}", level.price, level.qty);
            }
        }
    }

    Ok(())
}

/// Loads the config file when given, otherwise falls back to defaults, then
/// applies the `--symbol` override.
fn resolve_config(path: &Option<String>, symbol: Option<String>) -> Result<EngineConfig> {
    let mut cfg = match path {
        Some(p) => config::load_config_path(p)?,
        None => config::load_config_str("symbol = \"BTCUSDT\"")?,
    };
    if let Some(symbol) = symbol {
        cfg.symbol = symbol.trim().to_uppercase();
    }
    Ok(cfg)
}

fn print_stats(label: &str, stats: &compare::SeriesStats) {
    println!(
        "{label}: {} bar(s), avg close {:.2}, avg vol {:.4}, total volume {:.2}, performance {:.2}%",
        stats.bars, stats.avg_close, stats.avg_volatility, stats.total_volume, stats.performance_pct
    );
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_default()
}
