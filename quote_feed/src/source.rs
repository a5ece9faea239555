//! The boundary between the dashboard and wherever quotes come from.

use quote_common::Result;
use quote_common::market::MarketSnapshot;
use quote_common::quote::Stock;
use quote_common::tickers::Ticker;

/// A provider of quote and market data.
///
/// Implementations block until the data is available or the request fails;
/// they are driven from the feed worker thread, never from the UI thread.
pub trait QuoteSource {
    /// Fetches one row per ticker. On error the caller keeps its previous rows.
    fn fetch_quotes(&self, tickers: &[Ticker]) -> Result<Vec<Stock>>;

    /// Fetches the market summary.
    fn fetch_market(&self) -> Result<MarketSnapshot>;
}
