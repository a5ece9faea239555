//!
//! Common types and utilities shared by the quote feed and the dashboard.
//!
//! This crate aggregates:
//! - `error` — unified error type `QuoteError` used across the workspace.
//! - `result` — handy `Result<T, QuoteError>` alias.
//! - `tickers` — validated ticker symbols and list parsing.
//! - `quote` — stock rows and the quote collection.
//! - `market` — market summary snapshot.
//! - `column` — columns of the quotes table.
//! - `sorter` — row ordering and grouping.
//! - `filter` — boolean filter expressions over stock rows.
//! - `profile` — persisted user settings.
#![warn(missing_docs)]
pub mod column;
pub mod error;
pub mod filter;
pub mod market;
pub mod profile;
pub mod quote;
pub mod result;
pub mod sorter;
pub mod tickers;

pub use error::QuoteError;
pub use result::Result;
pub use tickers::{Ticker, TickerParser};
