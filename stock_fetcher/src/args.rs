//! Command-line arguments for the stock fetcher.
//!
//! Every flag is optional; without any the default watchlist is fetched into
//! `./data`.
use std::path::PathBuf;

use clap::Parser;
use stock_common::net::ENDPOINT_TEMPLATE;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Fetch end-of-day quotes into a JSON snapshot", long_about = None)]
pub struct Args {
    /// Repository root; the snapshot goes to `<root>/data`.
    #[clap(long, default_value = ".")]
    pub root: PathBuf,

    /// Tickers to fetch, separated by commas or spaces.
    #[clap(long, conflicts_with = "tickers_file")]
    pub tickers: Option<String>,

    /// Path to a text file with tickers.
    /// Tickers may be separated by commas, spaces, or new lines.
    #[clap(long)]
    pub tickers_file: Option<PathBuf>,

    /// Chart endpoint template containing `{ticker}`.
    #[clap(long, default_value = ENDPOINT_TEMPLATE)]
    pub endpoint: String,

    /// Skip the random pause between requests.
    #[clap(long)]
    pub no_delay: bool,
}
