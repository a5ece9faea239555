//! Quote feed: retrieval of stock quotes and market data for the dashboard.
//!
//! - `net` — Yahoo endpoint constants and URL construction.
//! - `source` — the `QuoteSource` trait the dashboard depends on.
//! - `yahoo` — JSON response parsing and the blocking HTTP client.
//! - `worker` — background thread that runs fetches off the UI thread and
//!   reports back over crossbeam channels.
#![warn(missing_docs)]
pub mod net;
pub mod source;
pub mod worker;
pub mod yahoo;

pub use source::QuoteSource;
pub use worker::{FeedEvent, FeedRequest, FeedWorker};
pub use yahoo::YahooClient;
