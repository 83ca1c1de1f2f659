//! Command-line arguments for the stock reporter.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Render the latest snapshot and refresh the README", long_about = None)]
pub struct Args {
    /// Repository root holding `data/`, `charts/` and `README.md`.
    #[clap(long, default_value = ".")]
    pub root: PathBuf,

    /// Step to run.
    #[command(subcommand)]
    pub command: Step,
}

/// Reporting steps.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Step {
    /// Render `charts/chart_<stamp>.png` from the newest snapshot.
    Chart,
    /// Patch the README date marker and chart reference.
    Readme {
        /// Only update the date marker.
        #[clap(long)]
        no_chart_ref: bool,
    },
    /// `chart` followed by `readme`.
    All,
}
