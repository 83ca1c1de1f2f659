//! Quote sources.
//!
//! `QuoteSource` is the seam between the batch loop and the network: the batch
//! only needs "give me today's prices for this ticker or tell me why not".
use std::error::Error as _;

use log::debug;
use reqwest::blocking::Client;
use stock_common::config::FetchConfig;
use stock_common::net::QUERY;
use stock_common::{PipelineError, QuotePrices, Result, Ticker};

use crate::parser::parse_chart;

/// Anything that can price a single ticker.
pub trait QuoteSource {
    /// Fetch the day's prices for `ticker`.
    fn fetch(&self, ticker: &Ticker) -> Result<QuotePrices>;
}

/// Flatten a reqwest error and its source chain into one message.
///
/// The top-level message alone ("error sending request for url ...") hides
/// whether the request timed out or the connection was refused.
fn http_error(err: reqwest::Error) -> PipelineError {
    let mut message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    };
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    PipelineError::Http(message)
}

/// Blocking client for the public chart endpoint.
pub struct YahooSource {
    client: Client,
    config: FetchConfig,
}

impl YahooSource {
    /// Build a client with the configured timeout and user agent.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(http_error)?;
        Ok(Self::with_client(client, config))
    }

    /// Use a pre-built client; only the endpoint of `config` is consulted.
    pub fn with_client(client: Client, config: &FetchConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }
}

impl QuoteSource for YahooSource {
    fn fetch(&self, ticker: &Ticker) -> Result<QuotePrices> {
        let url = self.config.url_for(ticker);
        debug!("GET {} {:?}", url, QUERY);

        let response = self
            .client
            .get(&url)
            .query(&QUERY)
            .send()
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().map_err(http_error)?;
        parse_chart(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::fetch_all;
    use stock_common::config::DelayPolicy;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    /// Serve exactly one HTTP response and hand back the request head.
    fn one_shot_server(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let mut stream = stream;
            let response = format!(
                "{status_line}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(head);
        });

        (format!("http://127.0.0.1:{port}/v8/finance/chart/{{ticker}}"), rx)
    }

    fn source_with_timeout(endpoint: &str, timeout: Duration) -> YahooSource {
        let config = FetchConfig {
            endpoint: endpoint.to_string(),
            timeout,
            ..FetchConfig::default()
        };
        let client = Client::builder()
            .no_proxy()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap();
        YahooSource::with_client(client, &config)
    }

    fn test_source(endpoint: &str) -> YahooSource {
        source_with_timeout(endpoint, Duration::from_secs(5))
    }

    #[test]
    fn sends_query_and_user_agent_and_parses_body() {
        let body = r#"{"chart":{"result":[{
            "meta":{"currency":"USD","regularMarketPrice":150.0,"previousClose":148.0},
            "indicators":{"quote":[{
                "open":[149.0],"high":[151.0],"low":[147.0],"close":[150.0],"volume":[1000]
            }]}
        }],"error":null}}"#;
        let (endpoint, rx) = one_shot_server("HTTP/1.1 200 OK", body);

        let prices = test_source(&endpoint).fetch(&"AAPL".parse().unwrap()).unwrap();
        assert_eq!(prices.regular_market_price, Some(150.0));
        assert_eq!(prices.volume, Some(1000));

        let head = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(head.starts_with("GET /v8/finance/chart/AAPL?interval=1d&range=1d HTTP/1.1"));
        assert!(head.to_ascii_lowercase().contains("user-agent: mozilla/5.0"));
    }

    #[test]
    fn non_success_status_is_an_error() {
        let (endpoint, _rx) = one_shot_server("HTTP/1.1 404 Not Found", "{}");
        let err = test_source(&endpoint).fetch(&"ZZZZ".parse().unwrap()).unwrap_err();
        match err {
            PipelineError::HttpStatus { status, url } => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/v8/finance/chart/ZZZZ"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn connection_refused_is_an_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = format!("http://127.0.0.1:{port}/chart/{{ticker}}");
        let err = test_source(&endpoint).fetch(&"AAPL".parse().unwrap()).unwrap_err();
        assert!(matches!(err, PipelineError::Http(_)));
    }

    #[test]
    fn silent_server_times_out_into_error_record() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let (_stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(5));
        });

        let endpoint = format!("http://127.0.0.1:{port}/chart/{{ticker}}");
        let source = source_with_timeout(&endpoint, Duration::from_secs(1));
        let tickers: Vec<Ticker> = vec!["MSFT".parse().unwrap()];
        let records = fetch_all(&source, &tickers, &DelayPolicy::none(), |_| {});

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticker.as_str(), "MSFT");
        assert!(records[0].prices().is_none());
        let error = records[0].error().unwrap().to_ascii_lowercase();
        assert!(error.contains("timed out"), "error without timeout cause: {error}");
    }
}
