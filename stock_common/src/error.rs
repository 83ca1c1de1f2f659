//! Error types shared between the fetcher and the reporter.
//!
//! The `PipelineError` enum unifies the failure cases of both processes: file
//! I/O, JSON encoding, HTTP transport, response shape problems and the
//! rendering/patching steps.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Unified error type shared by every crate in the workspace.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// I/O error originating from the standard library or files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Upstream answered with a non-success status code.
    #[error("HTTP status {status} for {url}")]
    HttpStatus {
        /// Numeric status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// A required key was absent from the quote response.
    #[error("Missing field in quote response: {0}")]
    MissingField(&'static str),

    /// The quote API reported an error object instead of a result.
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// Error while parsing the ticker file into `Ticker` values.
    #[error("Parse tickers file error: {0}")]
    ParseTickersFile(String),

    /// A ticker symbol failed validation.
    #[error("Invalid ticker symbol: {0:?}")]
    InvalidTicker(String),

    /// Snapshots are immutable; a file with this name already exists.
    #[error("Snapshot already exists: {}", .0.display())]
    SnapshotExists(PathBuf),

    /// Chart drawing or image encoding failed.
    #[error("Chart rendering error: {0}")]
    Chart(String),

    /// Invalid regular expression.
    #[error("Regex error: {0}")]
    Regex(String),
}
