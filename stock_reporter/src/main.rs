//! Stock Reporter — turns the newest JSON snapshot into a bar chart and keeps
//! the README's "Last Updated" marker and chart reference current.
//!
//! Usage example (CLI):
//! ```bash
//! stock_reporter chart
//! stock_reporter --root . readme
//! stock_reporter all
//! ```
//!
//! Missing inputs (no snapshot, nothing plottable, no README) are reported and
//! the step ends normally. Any other failure is logged and the process still
//! exits normally.
#![warn(missing_docs)]
mod args;
mod chart;
mod readme;

use crate::args::{Args, Step};
use crate::chart::ChartOutcome;
use chrono::Utc;
use clap::Parser;
use log::{error, info};
use stock_common::Result;
use stock_common::config::Layout;

fn run_chart(layout: &Layout) -> Result<()> {
    match chart::generate_chart(layout)? {
        ChartOutcome::Rendered { path, .. } => info!("Chart step done: {}", path.display()),
        outcome => info!("Chart step skipped: {:?}", outcome),
    }
    Ok(())
}

fn run_readme(layout: &Layout, manage_chart: bool) -> Result<()> {
    let today = Utc::now().date_naive();
    let outcome = readme::update_readme(&layout.readme, &layout.charts_dir, today, manage_chart)?;
    info!("README step: {:?}", outcome);
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let layout = Layout::from_root(&args.root);
    match &args.command {
        Step::Chart => run_chart(&layout),
        Step::Readme { no_chart_ref } => run_readme(&layout, !no_chart_ref),
        Step::All => {
            if let Err(e) = run_chart(&layout) {
                error!("Chart step failed: {}", e);
            }
            run_readme(&layout, true)
        }
    }
}

fn main() {
    init_logger();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("Report aborted: {}", e);
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
