//! Market-wide indicators shown above the quotes table.

use crate::error::QuoteError;

/// One index, commodity or currency line in the market summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketIndex {
    /// Display label such as `Dow` or `Gold`.
    pub label: String,
    /// Latest value.
    pub latest: String,
    /// Change since the previous close.
    pub change: String,
    /// Change in percent.
    pub change_pct: String,
    /// True when the change is not negative.
    pub advancing: bool,
}

/// A single fetched view of the market.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    /// True while regular trading hours are in progress.
    pub open: bool,
    /// Indices in display order.
    pub indices: Vec<MarketIndex>,
}

/// Latest market snapshot plus the last fetch error.
#[derive(Debug, Clone, Default)]
pub struct Market {
    snapshot: Option<MarketSnapshot>,
    error: Option<String>,
}

impl Market {
    /// Creates a market that has not been fetched yet. It reports itself as
    /// open so that the first quote refresh is never skipped.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the last snapshot says regular trading is over.
    pub fn is_closed(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| !s.open)
    }

    /// Indices of the last successful snapshot.
    pub fn indices(&self) -> &[MarketIndex] {
        self.snapshot.as_ref().map(|s| s.indices.as_slice()).unwrap_or(&[])
    }

    /// The error message of the last failed fetch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Applies the outcome of a market fetch, keeping the previous snapshot
    /// on failure.
    pub fn apply(&mut self, outcome: Result<MarketSnapshot, QuoteError>) {
        match outcome {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.error = None;
            }
            Err(e) => self.error = Some(format!("Error fetching market data... {}", e)),
        }
    }
}
