//! Fetching a whole watchlist and persisting the snapshot.
//!
//! Per-ticker failures never abort the batch: each `QuoteSource::fetch` result
//! is collapsed into a `QuoteRecord` and the loop moves on. Requests are spaced
//! by a random pause drawn from `DelayPolicy`; there is no pause after the
//! last request.
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, warn};
use rand::Rng;
use stock_common::artifacts::{ArtifactKind, Stamp};
use stock_common::config::{DelayPolicy, FetchConfig, Layout};
use stock_common::{QuoteRecord, Result, Snapshot, Ticker};

use crate::source::QuoteSource;

/// Draw one pause from `delay`.
pub fn sample_delay(delay: &DelayPolicy) -> Duration {
    let u: f64 = rand::rng().random();
    delay.scale(u)
}

/// Fetch every ticker in order, calling `sleep` between requests.
pub fn fetch_all<S, F>(
    source: &S,
    tickers: &[Ticker],
    delay: &DelayPolicy,
    mut sleep: F,
) -> Vec<QuoteRecord>
where
    S: QuoteSource + ?Sized,
    F: FnMut(Duration),
{
    let mut records = Vec::with_capacity(tickers.len());

    for (i, ticker) in tickers.iter().enumerate() {
        if i > 0 && !delay.is_none() {
            sleep(sample_delay(delay));
        }

        info!("Fetching {}...", ticker);
        let outcome = source.fetch(ticker);
        if let Err(e) = &outcome {
            warn!("Error fetching {}: {}", ticker, e);
        }
        records.push(QuoteRecord::from_outcome(ticker.clone(), outcome));
    }
    records
}

/// Write `snapshot` as `<data_dir>/stock_prices_<stamp>.json`, creating the directory.
pub fn write_snapshot(snapshot: &Snapshot, data_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(data_dir)?;
    let stamp = Stamp::from_datetime(snapshot.timestamp);
    let path = data_dir.join(ArtifactKind::Snapshot.file_name(stamp));
    snapshot.write_new(&path)?;
    Ok(path)
}

/// Human-readable one-line-per-ticker summary.
pub fn summary_lines(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .stocks
        .iter()
        .map(|record| match (record.error(), record.price()) {
            (Some(error), _) => format!("{}: ERROR - {}", record.ticker, error),
            (None, Some(price)) => format!("{}: ${}", record.ticker, price),
            (None, None) => format!("{}: $N/A", record.ticker),
        })
        .collect()
}

/// Fetch the configured watchlist and write one snapshot stamped by `now`.
///
/// `now` is read once, after the last request.
pub fn run<S, C>(source: &S, config: &FetchConfig, layout: &Layout, now: C) -> Result<PathBuf>
where
    S: QuoteSource + ?Sized,
    C: FnOnce() -> DateTime<Utc>,
{
    info!("Starting stock data fetch...");
    let symbols: Vec<&str> = config.tickers.iter().map(Ticker::as_str).collect();
    info!("Target tickers: {}", symbols.join(", "));

    let records = fetch_all(source, &config.tickers, &config.delay, thread::sleep);
    let snapshot = Snapshot::new(now(), records);
    let path = write_snapshot(&snapshot, &layout.data_dir)?;

    info!("Data saved to {}", path.display());
    info!(
        "Total stocks fetched: {} ({} failed)",
        snapshot.stocks.len(),
        snapshot.failed_count()
    );
    info!("=== Summary ===");
    for line in summary_lines(&snapshot) {
        info!("{}", line);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use stock_common::{PipelineError, QuotePrices};

    struct FakeSource {
        prices: HashMap<&'static str, QuotePrices>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn new() -> Self {
            let mut prices = HashMap::new();
            prices.insert(
                "AAPL",
                QuotePrices {
                    regular_market_price: Some(150.0),
                    previous_close: Some(148.0),
                    ..QuotePrices::default()
                },
            );
            Self {
                prices,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl QuoteSource for FakeSource {
        fn fetch(&self, ticker: &Ticker) -> Result<QuotePrices> {
            self.calls.borrow_mut().push(ticker.to_string());
            self.prices
                .get(ticker.as_str())
                .cloned()
                .ok_or_else(|| PipelineError::Http(String::from("operation timed out")))
        }
    }

    fn tickers(symbols: &[&str]) -> Vec<Ticker> {
        symbols.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn one_record_per_ticker_in_request_order() {
        let source = FakeSource::new();
        let requested = tickers(&["MSFT", "AAPL", "TSLA"]);
        let records = fetch_all(&source, &requested, &DelayPolicy::none(), |_| {});

        let order: Vec<&str> = records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(order, vec!["MSFT", "AAPL", "TSLA"]);
        assert_eq!(*source.calls.borrow(), vec!["MSFT", "AAPL", "TSLA"]);
    }

    #[test]
    fn records_never_mix_error_and_prices() {
        let source = FakeSource::new();
        let requested = tickers(&["AAPL", "MSFT"]);
        let records = fetch_all(&source, &requested, &DelayPolicy::none(), |_| {});

        for record in &records {
            assert!(record.error().is_some() != record.prices().is_some());
        }
        assert_eq!(records[0].price(), Some(150.0));
        assert_eq!(records[1].error(), Some("HTTP error: operation timed out"));
    }

    #[test]
    fn sleeps_between_requests_only() {
        let source = FakeSource::new();
        let mut pauses = Vec::new();
        fetch_all(
            &source,
            &tickers(&["AAPL", "MSFT", "TSLA"]),
            &DelayPolicy::default(),
            |d| pauses.push(d),
        );

        assert_eq!(pauses.len(), 2);
        for pause in pauses {
            assert!(pause >= Duration::from_secs(1) && pause < Duration::from_secs(3));
        }
    }

    #[test]
    fn single_ticker_never_sleeps() {
        let source = FakeSource::new();
        let mut slept = false;
        fetch_all(&source, &tickers(&["AAPL"]), &DelayPolicy::default(), |_| slept = true);
        assert!(!slept);
    }

    #[test]
    fn writes_timestamped_snapshot_and_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let source = FakeSource::new();
        let requested = tickers(&["AAPL", "MSFT"]);
        let records = fetch_all(&source, &requested, &DelayPolicy::none(), |_| {});
        let stamp = Utc.with_ymd_and_hms(2024, 5, 5, 8, 30, 0).unwrap();
        let snapshot = Snapshot::new(stamp, records);

        let path = write_snapshot(&snapshot, &data_dir).unwrap();
        assert_eq!(path, data_dir.join("stock_prices_20240505_083000.json"));

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["timestamp"], "2024-05-05T08:30:00Z");
        assert_eq!(value["stocks"][0]["ticker"], "AAPL");
        assert_eq!(value["stocks"][0]["regularMarketPrice"], 150.0);
        assert_eq!(value["stocks"][0]["previousClose"], 148.0);
        assert_eq!(value["stocks"][1]["ticker"], "MSFT");
        assert!(value["stocks"][1]["error"].is_string());
        assert!(value["stocks"][1].get("regularMarketPrice").is_none());
    }

    #[test]
    fn run_writes_into_layout_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::from_root(dir.path());
        let config = FetchConfig {
            tickers: tickers(&["AAPL"]),
            delay: DelayPolicy::none(),
            ..FetchConfig::default()
        };

        let now = || Utc.with_ymd_and_hms(2024, 5, 5, 21, 5, 9).unwrap();

        let path = run(&FakeSource::new(), &config, &layout, now).unwrap();
        assert_eq!(path, layout.data_dir.join("stock_prices_20240505_210509.json"));
        let snapshot = Snapshot::load(&path).unwrap();
        assert_eq!(snapshot.timestamp, now());
        assert_eq!(snapshot.stocks.len(), 1);

        let err = run(&FakeSource::new(), &config, &layout, now).unwrap_err();
        assert!(matches!(err, PipelineError::SnapshotExists(_)));
    }

    #[test]
    fn summary_marks_errors() {
        let source = FakeSource::new();
        let requested = tickers(&["AAPL", "MSFT"]);
        let records = fetch_all(&source, &requested, &DelayPolicy::none(), |_| {});
        let lines = summary_lines(&Snapshot::new(Utc::now(), records));
        assert_eq!(lines[0], "AAPL: $150");
        assert_eq!(lines[1], "MSFT: ERROR - HTTP error: operation timed out");
    }
}
