//! Ticker symbols and list parsing shared by the feed and the dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuoteError;

/// Longest symbol accepted from the user or the profile.
pub const MAX_TICKER_LEN: usize = 12;

/// Trait providing list parsing for tickers.
pub trait TickerParser {
    /// Parses tickers from user input.
    ///
    /// Symbols may be separated by commas, spaces, or both. Empty pieces are
    /// skipped. Returns an error if any symbol is invalid; nothing is returned
    /// partially.
    fn parse_list(input: &str) -> Result<Vec<Ticker>, QuoteError>;
}

impl TickerParser for Ticker {
    fn parse_list(input: &str) -> Result<Vec<Self>, QuoteError> {
        let mut tickers: Vec<Ticker> = Vec::new();

        for piece in input.split(|c: char| c == ',' || c.is_whitespace()) {
            if piece.is_empty() {
                continue;
            }
            let ticker = piece.parse::<Self>()?;
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
        Ok(tickers)
    }
}

/// A validated, upper-cased instrument symbol such as `AAPL` or `^DJI`.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// The symbol text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ticker {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim();
        let valid = !symbol.is_empty()
            && symbol.len() <= MAX_TICKER_LEN
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));

        if !valid {
            return Err(QuoteError::InvalidTicker(symbol.to_string()));
        }
        Ok(Ticker(symbol.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Ticker {
    type Error = QuoteError;

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
