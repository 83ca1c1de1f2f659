//! Quote records and the JSON snapshot written once per fetch run.
//!
//! A `QuoteRecord` is either priced or failed. The two shapes are variants of
//! `QuoteStatus`, flattened next to `ticker` in the JSON object, so a record can
//! never carry both an `error` and price fields:
//!
//! ```json
//! { "ticker": "AAPL", "currency": "USD", "regularMarketPrice": 150.0, ... }
//! { "ticker": "MSFT", "error": "operation timed out" }
//! ```
use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PipelineError;
use crate::tickers::Ticker;

/// Currency assumed when the upstream metadata omits it.
pub const DEFAULT_CURRENCY: &str = "USD";

fn default_currency() -> String {
    String::from(DEFAULT_CURRENCY)
}

/// `null` currency falls back to the default.
fn currency_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_currency))
}

/// Accept integral and float volumes (`1000` and `1000.0`); negative or
/// non-finite values are dropped.
fn lenient_volume<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let volume = Option::<f64>::deserialize(deserializer)?;
    Ok(volume
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64))
}

/// Day prices extracted from a successful response. Absent values stay `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePrices {
    /// ISO currency code.
    #[serde(default = "default_currency", deserialize_with = "currency_or_default")]
    pub currency: String,
    /// Current market price.
    #[serde(default)]
    pub regular_market_price: Option<f64>,
    /// Previous session close.
    #[serde(default)]
    pub previous_close: Option<f64>,
    /// Day open.
    #[serde(default)]
    pub open: Option<f64>,
    /// Day high.
    #[serde(default)]
    pub high: Option<f64>,
    /// Day low.
    #[serde(default)]
    pub low: Option<f64>,
    /// Day close.
    #[serde(default)]
    pub close: Option<f64>,
    /// Day volume.
    #[serde(default, deserialize_with = "lenient_volume")]
    pub volume: Option<u64>,
}

impl Default for QuotePrices {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            regular_market_price: None,
            previous_close: None,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
        }
    }
}

/// Outcome stored for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuoteStatus {
    /// Fetch or parse failed; only the stringified error is kept.
    Failed {
        /// Human-readable failure reason.
        error: String,
    },
    /// Fetch succeeded.
    Priced(QuotePrices),
}

/// One entry of `Snapshot::stocks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Requested symbol.
    pub ticker: Ticker,
    /// Prices or error.
    #[serde(flatten)]
    pub status: QuoteStatus,
}

impl QuoteRecord {
    /// Record for a successful fetch.
    pub fn priced(ticker: Ticker, prices: QuotePrices) -> Self {
        Self {
            ticker,
            status: QuoteStatus::Priced(prices),
        }
    }

    /// Record for a failed fetch.
    pub fn failed(ticker: Ticker, error: impl Into<String>) -> Self {
        Self {
            ticker,
            status: QuoteStatus::Failed {
                error: error.into(),
            },
        }
    }

    /// Collapse a per-ticker result into a record.
    pub fn from_outcome<E: Display>(ticker: Ticker, outcome: Result<QuotePrices, E>) -> Self {
        match outcome {
            Ok(prices) => Self::priced(ticker, prices),
            Err(e) => Self::failed(ticker, e.to_string()),
        }
    }

    /// Prices when the fetch succeeded.
    pub fn prices(&self) -> Option<&QuotePrices> {
        match &self.status {
            QuoteStatus::Priced(prices) => Some(prices),
            QuoteStatus::Failed { .. } => None,
        }
    }

    /// Error message when the fetch failed.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            QuoteStatus::Failed { error } => Some(error),
            QuoteStatus::Priced(_) => None,
        }
    }

    /// Current market price, if any.
    pub fn price(&self) -> Option<f64> {
        self.prices().and_then(|p| p.regular_market_price)
    }

    /// Previous close, if any.
    pub fn previous_close(&self) -> Option<f64> {
        self.prices().and_then(|p| p.previous_close)
    }
}

/// Document written once per fetch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// UTC instant the run finished fetching.
    pub timestamp: DateTime<Utc>,
    /// One record per requested ticker, in request order.
    pub stocks: Vec<QuoteRecord>,
}

impl Snapshot {
    /// Build a snapshot from records collected in request order.
    pub fn new(timestamp: DateTime<Utc>, stocks: Vec<QuoteRecord>) -> Self {
        Self { timestamp, stocks }
    }

    /// Read a snapshot file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Pretty-printed UTF-8 JSON.
    pub fn to_pretty_json(&self) -> Result<String, PipelineError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Write to `path`, refusing to replace an existing file.
    ///
    /// The document is serialized before the file is opened.
    pub fn write_new(&self, path: &Path) -> Result<(), PipelineError> {
        let json = self.to_pretty_json()?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => PipelineError::SnapshotExists(path.to_path_buf()),
                _ => PipelineError::Io(e),
            })?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Count of records that carry an error.
    pub fn failed_count(&self) -> usize {
        self.stocks.iter().filter(|r| r.error().is_some()).count()
    }
}
