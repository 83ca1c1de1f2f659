//! Quote endpoint and HTTP constants used by the fetcher.

/// Chart endpoint; `{ticker}` is replaced with the symbol.
pub const ENDPOINT_TEMPLATE: &str = "https://query1.finance.yahoo.com/v8/finance/chart/{ticker}";
/// Query parameters selecting a single daily bar.
pub const QUERY: [(&str, &str); 2] = [("interval", "1d"), ("range", "1d")];
/// Per-request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 10;
/// Browser-like user agent; the endpoint rejects obvious script clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
/// Lower bound of the pause between requests, in seconds.
pub const MIN_DELAY_SECS: f64 = 1.0;
/// Exclusive upper bound of the pause between requests, in seconds.
pub const MAX_DELAY_SECS: f64 = 3.0;

/// Substitute `ticker` into an endpoint template.
pub fn chart_url(template: &str, ticker: &str) -> String {
    template.replace("{ticker}", ticker)
}
