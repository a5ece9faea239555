//! Yahoo Finance quote source.
//!
//! The v7 quote endpoint answers with
//! `{"quoteResponse": {"result": [{...}, ...], "error": null}}`, where the
//! fields of a result are a mix of JSON strings and numbers. Every value is
//! flattened to display text first (numbers get three decimals and a K/M/B/T
//! unit), then copied into a `Stock` or `MarketIndex`.

use log::{debug, info};
use quote_common::QuoteError;
use quote_common::Result;
use quote_common::market::{MarketIndex, MarketSnapshot};
use quote_common::quote::Stock;
use quote_common::sorter::parse_amount;
use quote_common::tickers::Ticker;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::net::{MARKET_SYMBOLS, REQUEST_TIMEOUT_SECS, quotes_url};
use crate::source::QuoteSource;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<HashMap<String, Value>>,
    #[serde(default)]
    error: Option<Value>,
}

/// Formats a number the way the table shows it: three decimals, with large
/// values scaled down and suffixed by a unit.
pub fn float_to_str(value: f64) -> String {
    let (scaled, unit) = if value > 1.0e12 {
        (value / 1.0e12, "T")
    } else if value > 1.0e9 {
        (value / 1.0e9, "B")
    } else if value > 1.0e6 {
        (value / 1.0e6, "M")
    } else if value > 1.0e5 {
        (value / 1.0e3, "K")
    } else {
        (value, "")
    };
    format!("{:.3}{}", scaled, unit)
}

fn flatten(raw: HashMap<String, Value>) -> HashMap<String, String> {
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.as_f64().map(float_to_str).unwrap_or_else(|| n.to_string()),
                other => other.to_string(),
            };
            (key, text)
        })
        .collect()
}

fn results(body: &[u8]) -> Result<Vec<HashMap<String, String>>> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    let response = envelope.quote_response;
    if let Some(error) = response.error.filter(|e| !e.is_null()) {
        return Err(QuoteError::Fetch(error.to_string()));
    }
    Ok(response.result.into_iter().map(flatten).collect())
}

fn field(fields: &HashMap<String, String>, key: &str) -> String {
    fields.get(key).cloned().unwrap_or_default()
}

fn is_advancing(change: &str) -> bool {
    change.trim().parse::<f64>().map(|c| c >= 0.0).unwrap_or(true)
}

/// Parses a quote response body into stock rows, in response order.
pub fn parse_quotes(body: &[u8]) -> Result<Vec<Stock>> {
    let stocks = results(body)?
        .into_iter()
        .map(|fields| {
            let change = field(&fields, "regularMarketChange");
            Stock {
                ticker: field(&fields, "symbol"),
                last_trade: field(&fields, "regularMarketPrice"),
                advancing: is_advancing(&change),
                change,
                change_pct: field(&fields, "regularMarketChangePercent"),
                open: field(&fields, "regularMarketOpen"),
                low: field(&fields, "regularMarketDayLow"),
                high: field(&fields, "regularMarketDayHigh"),
                low52: field(&fields, "fiftyTwoWeekLow"),
                high52: field(&fields, "fiftyTwoWeekHigh"),
                volume: field(&fields, "regularMarketVolume"),
                avg_volume: field(&fields, "averageDailyVolume10Day"),
                pe_ratio: field(&fields, "trailingPE"),
                pe_ratio_x: field(&fields, "trailingPE"),
                dividend: field(&fields, "trailingAnnualDividendRate"),
                dividend_yield: field(&fields, "trailingAnnualDividendYield"),
                market_cap: field(&fields, "marketCap"),
                market_cap_x: field(&fields, "marketCap"),
                currency: field(&fields, "currency"),
                pre_open: field(&fields, "preMarketChangePercent"),
                after_hours: field(&fields, "postMarketChangePercent"),
            }
        })
        .collect();
    Ok(stocks)
}

/// Parses a market response body. Labels come from `MARKET_SYMBOLS`; the
/// market is open when the first index reports regular trading.
pub fn parse_market(body: &[u8]) -> Result<MarketSnapshot> {
    let results = results(body)?;
    let open = results
        .first()
        .is_some_and(|fields| field(fields, "marketState") == "REGULAR");

    let indices = results
        .iter()
        .map(|fields| {
            let symbol = field(fields, "symbol");
            let label = MARKET_SYMBOLS
                .iter()
                .find(|(s, _)| *s == symbol)
                .map(|(_, label)| label.to_string())
                .unwrap_or(symbol);
            let change = field(fields, "regularMarketChange");
            MarketIndex {
                label,
                latest: field(fields, "regularMarketPrice"),
                advancing: parse_amount(&change) >= 0.0,
                change,
                change_pct: field(fields, "regularMarketChangePercent"),
            }
        })
        .collect();

    Ok(MarketSnapshot { open, indices })
}

/// Blocking HTTP client for the Yahoo quote endpoint.
pub struct YahooClient {
    http: reqwest::blocking::Client,
}

impl YahooClient {
    /// Creates a client with the request timeout from `net`.
    pub fn new() -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("quote_board/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QuoteError::Fetch(e.to_string()))?;
        Ok(Self { http })
    }

    fn get(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| QuoteError::Fetch(e.to_string()))?;
        let body = response.bytes().map_err(|e| QuoteError::Fetch(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl QuoteSource for YahooClient {
    fn fetch_quotes(&self, tickers: &[Ticker]) -> Result<Vec<Stock>> {
        let symbols: Vec<&str> = tickers.iter().map(Ticker::as_str).collect();
        let body = self.get(&quotes_url(&symbols))?;
        let stocks = parse_quotes(&body)?;
        info!("Fetched {} quotes for {} tickers", stocks.len(), tickers.len());
        Ok(stocks)
    }

    fn fetch_market(&self) -> Result<MarketSnapshot> {
        let symbols: Vec<&str> = MARKET_SYMBOLS.iter().map(|(s, _)| *s).collect();
        let body = self.get(&quotes_url(&symbols))?;
        parse_market(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "quoteResponse": {
            "result": [
                {
                    "symbol": "BA",
                    "regularMarketPrice": 331.76,
                    "regularMarketChange": -2.5,
                    "regularMarketChangePercent": -0.748,
                    "regularMarketVolume": 3456789,
                    "marketCap": 186700000000,
                    "currency": "USD",
                    "marketState": "REGULAR"
                },
                {
                    "symbol": "GOOG",
                    "regularMarketPrice": 1214.38,
                    "regularMarketChange": 0.0,
                    "trailingPE": "N/A"
                }
            ],
            "error": null
        }
    }"#;

    #[test]
    fn numbers_are_formatted_with_units() {
        assert_eq!(float_to_str(331.76), "331.760");
        assert_eq!(float_to_str(250_000.0), "250.000K");
        assert_eq!(float_to_str(3_456_789.0), "3.457M");
        assert_eq!(float_to_str(186_700_000_000.0), "186.700B");
        assert_eq!(float_to_str(2.5e12), "2.500T");
    }

    #[test]
    fn quotes_are_parsed_in_response_order() {
        let stocks = parse_quotes(SAMPLE.as_bytes()).unwrap();

        assert_eq!(stocks.len(), 2);
        assert_eq!(stocks[0].ticker, "BA");
        assert_eq!(stocks[0].last_trade, "331.760");
        assert_eq!(stocks[0].volume, "3.457M");
        assert_eq!(stocks[0].currency, "USD");
        assert_eq!(stocks[0].market_cap_x, stocks[0].market_cap);
        assert!(!stocks[0].advancing);

        assert_eq!(stocks[1].ticker, "GOOG");
        assert_eq!(stocks[1].last_trade, "1214.380");
        assert_eq!(stocks[1].pe_ratio, "N/A");
        assert_eq!(stocks[1].pe_ratio_x, stocks[1].pe_ratio);
        assert_eq!(stocks[1].open, "");
        assert!(stocks[1].advancing);
    }

    #[test]
    fn response_error_is_a_fetch_failure() {
        let body = br#"{"quoteResponse": {"result": [], "error": {"code": "Unauthorized"}}}"#;
        assert!(matches!(parse_quotes(body), Err(QuoteError::Fetch(_))));
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        assert!(matches!(parse_quotes(b"<html>"), Err(QuoteError::SerdeJson(_))));
    }

    #[test]
    fn market_uses_labels_and_state_of_first_index() {
        let body = br#"{"quoteResponse": {"result": [
            {"symbol": "^DJI", "regularMarketPrice": 38000.5, "regularMarketChange": 120.25,
             "regularMarketChangePercent": 0.32, "marketState": "POST"},
            {"symbol": "XYZ", "regularMarketPrice": 1.5, "regularMarketChange": -0.1}
        ]}}"#;
        let market = parse_market(body).unwrap();

        assert!(!market.open);
        assert_eq!(market.indices[0].label, "Dow");
        assert_eq!(market.indices[0].latest, "38000.500");
        assert!(market.indices[0].advancing);
        assert_eq!(market.indices[1].label, "XYZ");
        assert!(!market.indices[1].advancing);
    }
}
