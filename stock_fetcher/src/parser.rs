//! Chart endpoint response parsing.
//!
//! Only a handful of keys matter: `chart.result[0].meta` for currency and the
//! current/previous price, and `chart.result[0].indicators.quote[0]` for the
//! day's OHLCV arrays. Structural keys that are missing are reported as
//! `PipelineError::MissingField`; individual price values that are missing are
//! simply `None`.
use log::debug;
use serde::Deserialize;
use stock_common::snapshot::DEFAULT_CURRENCY;
use stock_common::{PipelineError, QuotePrices, Result};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Option<ChartEnvelope>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<DayQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct DayQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn first(values: &[Option<f64>]) -> Option<f64> {
    values.first().copied().flatten()
}

/// Extract the day's prices from a chart response body.
pub fn parse_chart(body: &str) -> Result<QuotePrices> {
    let response: ChartResponse = serde_json::from_str(body)?;
    let chart = response.chart.ok_or(PipelineError::MissingField("chart"))?;

    if let Some(err) = chart.error {
        let message = match (err.code, err.description) {
            (Some(code), Some(desc)) => format!("{code}: {desc}"),
            (Some(text), None) | (None, Some(text)) => text,
            (None, None) => String::from("unknown error"),
        };
        return Err(PipelineError::UpstreamError(message));
    }

    let result = chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or(PipelineError::MissingField("chart.result[0]"))?;
    let meta = result.meta.ok_or(PipelineError::MissingField("meta"))?;
    let quote = result
        .indicators
        .ok_or(PipelineError::MissingField("indicators"))?
        .quote
        .into_iter()
        .next()
        .ok_or(PipelineError::MissingField("indicators.quote[0]"))?;

    debug!(
        "meta: price={:?} prev={:?} chart_prev={:?}",
        meta.regular_market_price, meta.previous_close, meta.chart_previous_close
    );

    Ok(QuotePrices {
        currency: meta
            .currency
            .unwrap_or_else(|| String::from(DEFAULT_CURRENCY)),
        regular_market_price: meta.regular_market_price,
        previous_close: meta.previous_close.or(meta.chart_previous_close),
        open: first(&quote.open),
        high: first(&quote.high),
        low: first(&quote.low),
        close: first(&quote.close),
        volume: first(&quote.volume)
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64),
    })
}
