//!
//! Common types and utilities shared by the stock fetcher and reporter.
//!
//! This crate aggregates:
//! - `error` — unified error type `PipelineError` used across the workspace.
//! - `result` — handy `Result<T, PipelineError>` alias.
//! - `tickers` — ticker symbols and parsing helpers.
//! - `snapshot` — quote records and the JSON snapshot written per run.
//! - `artifacts` — timestamped file naming and "latest artifact" lookup.
//! - `net` — endpoint and HTTP constants.
//! - `config` — explicit fetch configuration and directory layout.
#![warn(missing_docs)]
pub mod artifacts;
pub mod config;
pub mod error;
pub mod net;
pub mod result;
pub mod snapshot;
pub mod tickers;

pub use error::PipelineError;
pub use result::Result;
pub use snapshot::{QuotePrices, QuoteRecord, Snapshot};
pub use tickers::Ticker;
