//! Explicit run configuration.
//!
//! Defaults come from `net`; binaries override them from the command line and
//! pass the resulting values down instead of reading globals.
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::net;
use crate::tickers::{Ticker, default_tickers};

/// Everything the fetch routine needs to know.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Symbols to fetch, in output order.
    pub tickers: Vec<Ticker>,
    /// Endpoint template containing `{ticker}`.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Pause between successive requests.
    pub delay: DelayPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            endpoint: net::ENDPOINT_TEMPLATE.to_string(),
            timeout: Duration::from_secs(net::TIMEOUT_SECS),
            user_agent: net::USER_AGENT.to_string(),
            delay: DelayPolicy::default(),
        }
    }
}

impl FetchConfig {
    /// Chart URL for one symbol.
    pub fn url_for(&self, ticker: &Ticker) -> String {
        net::chart_url(&self.endpoint, ticker.as_str())
    }
}

/// Half-open range `[min, max)` of seconds to sleep between requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayPolicy {
    /// Inclusive lower bound.
    pub min_secs: f64,
    /// Exclusive upper bound.
    pub max_secs: f64,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            min_secs: net::MIN_DELAY_SECS,
            max_secs: net::MAX_DELAY_SECS,
        }
    }
}

impl DelayPolicy {
    /// No pause at all.
    pub fn none() -> Self {
        Self {
            min_secs: 0.0,
            max_secs: 0.0,
        }
    }

    /// Whether sampling can ever produce a non-zero pause.
    pub fn is_none(&self) -> bool {
        self.max_secs <= 0.0
    }

    /// Map a unit sample `u` in `[0, 1)` onto the range.
    pub fn scale(&self, u: f64) -> Duration {
        if self.is_none() || self.max_secs <= self.min_secs {
            return Duration::from_secs_f64(self.min_secs.max(0.0));
        }
        Duration::from_secs_f64(self.min_secs + (self.max_secs - self.min_secs) * u)
    }
}

/// On-disk locations used by both processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Directory receiving `stock_prices_*.json`.
    pub data_dir: PathBuf,
    /// Directory receiving `chart_*.png`.
    pub charts_dir: PathBuf,
    /// Document patched by the README step.
    pub readme: PathBuf,
}

impl Layout {
    /// Standard layout below a repository root.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            data_dir: root.join("data"),
            charts_dir: root.join("charts"),
            readme: root.join("README.md"),
        }
    }
}
