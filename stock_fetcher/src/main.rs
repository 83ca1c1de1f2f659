//! Stock Fetcher — queries the public chart endpoint for every ticker of a
//! watchlist and writes one timestamped JSON snapshot per run.
//!
//! Usage example (CLI):
//! ```bash
//! stock_fetcher --root . --tickers AAPL,MSFT
//! stock_fetcher --tickers-file ./tickers.txt --no-delay
//! ```
//!
//! A ticker that fails (HTTP error, timeout, unexpected response shape) is
//! recorded with an `error` string and the run continues. Failures that stop
//! the run entirely, such as an unwritable data directory, are logged and the
//! process still exits normally.
#![warn(missing_docs)]
mod args;
mod batch;
mod parser;
mod source;

use crate::args::Args;
use crate::source::YahooSource;
use chrono::Utc;
use clap::Parser;
use log::{error, info};
use stock_common::Result;
use stock_common::config::{DelayPolicy, FetchConfig, Layout};
use stock_common::tickers::{self, Ticker, TickerParser};
use std::fs::File;
use std::io::BufReader;

fn build_config(args: &Args) -> Result<FetchConfig> {
    let tickers = match (&args.tickers, &args.tickers_file) {
        (Some(list), _) => tickers::parse_list(list)?,
        (None, Some(path)) => Ticker::parse_from_file(BufReader::new(File::open(path)?))?,
        (None, None) => tickers::default_tickers(),
    };

    let mut config = FetchConfig {
        tickers,
        endpoint: args.endpoint.clone(),
        ..FetchConfig::default()
    };
    if args.no_delay {
        config.delay = DelayPolicy::none();
    }
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;
    let layout = Layout::from_root(&args.root);
    let source = YahooSource::new(&config)?;
    batch::run(&source, &config, &layout, Utc::now)?;
    Ok(())
}

fn main() {
    init_logger();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => info!("Fetch finished."),
        Err(e) => error!("Fetch aborted: {}", e),
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
