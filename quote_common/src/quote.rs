//! Stock records and the quote collection shown in the table.
//!
//! Every field of a `Stock` is kept as display text, exactly as the quote
//! source formatted it; numeric interpretation happens in `sorter` and
//! `filter`. A `Quotes` collection is replaced wholesale on every successful
//! fetch and keeps its previous rows when a fetch fails.

use crate::error::QuoteError;

/// Market data for a single ticker symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stock {
    /// Ticker symbol (e.g., `AAPL`).
    pub ticker: String,
    /// Last traded price.
    pub last_trade: String,
    /// Price change since the previous close.
    pub change: String,
    /// Price change in percent.
    pub change_pct: String,
    /// Market open price.
    pub open: String,
    /// Day's low.
    pub low: String,
    /// Day's high.
    pub high: String,
    /// 52-week low.
    pub low52: String,
    /// 52-week high.
    pub high52: String,
    /// Traded volume.
    pub volume: String,
    /// Average daily volume.
    pub avg_volume: String,
    /// Real-time P/E ratio.
    pub pe_ratio: String,
    /// Fallback P/E ratio used when the real-time value is missing.
    pub pe_ratio_x: String,
    /// Annual dividend.
    pub dividend: String,
    /// Dividend yield.
    pub dividend_yield: String,
    /// Real-time market capitalization.
    pub market_cap: String,
    /// Fallback market capitalization.
    pub market_cap_x: String,
    /// Currency code of the quote.
    pub currency: String,
    /// Pre-market change in percent, if reported.
    pub pre_open: String,
    /// After-hours change in percent, if reported.
    pub after_hours: String,
    /// True when the change is not negative.
    pub advancing: bool,
}

/// Ordered quotes for the tracked tickers plus the last fetch error.
#[derive(Debug, Clone, Default)]
pub struct Quotes {
    stocks: Vec<Stock>,
    error: Option<String>,
    fetched: bool,
}

impl Quotes {
    /// Creates an empty collection that has never been fetched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rows in the order the quote source returned them.
    pub fn stocks(&self) -> &[Stock] {
        &self.stocks
    }

    /// The error message of the last failed fetch, cleared by the next success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True once at least one fetch has completed successfully since the
    /// last `invalidate`.
    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    /// Returns true if quotes should be requested on a refresh tick: they have
    /// never been fetched, or the market is still open.
    pub fn needs_fetch(&self, market_closed: bool) -> bool {
        !self.fetched || !market_closed
    }

    /// Applies the outcome of a fetch. Success replaces every row and clears
    /// the error; failure keeps the previous rows and records the error.
    pub fn apply(&mut self, outcome: Result<Vec<Stock>, QuoteError>) {
        match outcome {
            Ok(stocks) => {
                self.stocks = stocks;
                self.error = None;
                self.fetched = true;
            }
            Err(e) => {
                self.error = Some(format!("Error fetching stock quotes... {}", e));
            }
        }
    }

    /// Drops the current rows so the next refresh fetches unconditionally.
    /// Called when the tracked ticker set changes.
    pub fn invalidate(&mut self) {
        self.stocks.clear();
        self.fetched = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(ticker: &str) -> Stock {
        Stock {
            ticker: ticker.to_string(),
            ..Stock::default()
        }
    }

    #[test]
    fn failed_fetch_keeps_previous_rows() {
        let mut quotes = Quotes::new();
        quotes.apply(Ok(vec![stock("AAPL"), stock("IBM")]));
        quotes.apply(Err(QuoteError::Fetch("timeout".into())));

        assert_eq!(quotes.stocks().len(), 2);
        assert!(quotes.error().unwrap().contains("timeout"));
    }

    #[test]
    fn successful_fetch_clears_error() {
        let mut quotes = Quotes::new();
        quotes.apply(Err(QuoteError::Fetch("offline".into())));
        quotes.apply(Ok(vec![stock("KO")]));

        assert_eq!(quotes.error(), None);
        assert_eq!(quotes.stocks()[0].ticker, "KO");
    }

    #[test]
    fn closed_market_skips_refetch_only_after_first_fetch() {
        let mut quotes = Quotes::new();
        assert!(quotes.needs_fetch(true));
        quotes.apply(Ok(vec![stock("V")]));
        assert!(!quotes.needs_fetch(true));
        assert!(quotes.needs_fetch(false));

        quotes.invalidate();
        assert!(quotes.stocks().is_empty());
        assert!(quotes.needs_fetch(true));
    }
}
