//! Ticker symbols and helpers shared between the fetcher and the reporter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::PipelineError;

/// Longest symbol accepted, e.g. `BRK-B` or `^GSPC` fit comfortably.
const MAX_TICKER_LEN: usize = 15;

/// Trait providing file parsing for tickers.
pub trait TickerParser {
    /// Parses tickers from a buffered reader.
    ///
    /// Symbols may be separated by commas, spaces, or new lines. Lines starting
    /// with `#` are ignored. Returns an error if any entry cannot be parsed.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Ticker>, PipelineError>;
}

impl TickerParser for Ticker {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, PipelineError> {
        let mut tickers = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(PipelineError::Io)?;
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }

            for token in split_symbols(trimmed_line) {
                match token.parse::<Self>() {
                    Ok(ticker) => tickers.push(ticker),
                    Err(e) => return Err(PipelineError::ParseTickersFile(e.to_string())),
                }
            }
        }
        Ok(tickers)
    }
}

/// Parse a comma/whitespace separated list such as `"AAPL, msft TSLA"`.
pub fn parse_list(raw: &str) -> Result<Vec<Ticker>, PipelineError> {
    split_symbols(raw).map(str::parse).collect()
}

fn split_symbols(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}

/// The symbols fetched when no list is supplied.
pub fn default_tickers() -> Vec<Ticker> {
    ["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA"]
        .into_iter()
        .map(|s| Ticker(s.to_string()))
        .collect()
}

/// Upper-cased exchange symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Symbol as sent to the quote API.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ticker {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim();
        let valid_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=');
        if symbol.is_empty() || symbol.len() > MAX_TICKER_LEN || !symbol.chars().all(valid_char) {
            return Err(PipelineError::InvalidTicker(s.to_string()));
        }
        Ok(Ticker(symbol.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Ticker {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_mixed_separators_and_skips_comments() {
        let input = "# watchlist\naapl, MSFT\n\n  tsla   brk-b\n";
        let tickers = Ticker::parse_from_file(Cursor::new(input)).unwrap();
        let symbols: Vec<&str> = tickers.iter().map(Ticker::as_str).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "TSLA", "BRK-B"]);
    }

    #[test]
    fn rejects_invalid_symbol_in_file() {
        let err = Ticker::parse_from_file(Cursor::new("AAPL\nBAD/SYM\n")).unwrap_err();
        assert!(matches!(err, PipelineError::ParseTickersFile(_)));
    }

    #[test]
    fn rejects_empty_and_overlong_symbols() {
        assert!("".parse::<Ticker>().is_err());
        assert!("ABCDEFGHIJKLMNOP".parse::<Ticker>().is_err());
        assert_eq!("^gspc".parse::<Ticker>().unwrap().as_str(), "^GSPC");
    }

    #[test]
    fn list_keeps_request_order() {
        let tickers = parse_list("MSFT,AAPL GOOGL").unwrap();
        assert_eq!(tickers[0].as_str(), "MSFT");
        assert_eq!(tickers[2].as_str(), "GOOGL");
    }

    #[test]
    fn default_list_matches_watchlist() {
        let symbols: Vec<String> = default_tickers().into_iter().map(String::from).collect();
        assert_eq!(symbols, ["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA"]);
    }
}
