//! Background fetch worker.
//!
//! The dashboard never blocks on the network: it sends `FeedRequest`s to a
//! single worker thread and receives `FeedEvent`s on a channel that is one
//! more arm of its `select!` loop. Requests are served strictly in order, so
//! at most one fetch is ever in flight.
//!
//! The worker terminates when either:
//! - a `FeedRequest::Shutdown` is received, or
//! - the request channel is disconnected, or
//! - the event receiver has been dropped.
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info, warn};
use quote_common::QuoteError;
use quote_common::Result;
use quote_common::market::MarketSnapshot;
use quote_common::quote::Stock;
use quote_common::tickers::Ticker;
use std::thread::{self, JoinHandle};

use crate::source::QuoteSource;

/// Work sent from the dashboard to the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedRequest {
    /// Fetch quotes for these tickers.
    Quotes(Vec<Ticker>),
    /// Fetch the market summary.
    Market,
    /// Stop the worker.
    Shutdown,
}

/// Results sent from the worker back to the dashboard.
#[derive(Debug)]
pub enum FeedEvent {
    /// Outcome of a `FeedRequest::Quotes`.
    Quotes(Result<Vec<Stock>, QuoteError>),
    /// Outcome of a `FeedRequest::Market`.
    Market(Result<MarketSnapshot, QuoteError>),
}

/// Owner of the fetch thread.
pub struct FeedWorker;

impl FeedWorker {
    /// Spawns the worker around `source` and returns the request sender, the
    /// event receiver, and the thread handle.
    pub fn start<S>(source: S) -> (Sender<FeedRequest>, Receiver<FeedEvent>, JoinHandle<()>)
    where
        S: QuoteSource + Send + 'static,
    {
        let (request_tx, request_rx) = unbounded::<FeedRequest>();
        let (event_tx, event_rx) = unbounded::<FeedEvent>();

        let handle = thread::spawn(move || {
            info!("Feed worker started");
            if let Err(e) = Self::serve(&source, request_rx, event_tx) {
                error!("Feed worker stopped: {}", e);
            }
            info!("Feed worker stopping...");
        });
        (request_tx, event_rx, handle)
    }

    /// Serves requests until shutdown. Split out of `start` so it can be
    /// driven on the calling thread.
    pub fn serve<S: QuoteSource>(
        source: &S,
        requests: Receiver<FeedRequest>,
        events: Sender<FeedEvent>,
    ) -> Result<(), QuoteError> {
        for request in requests.iter() {
            let event = match request {
                FeedRequest::Quotes(tickers) => {
                    debug!("Fetching quotes for {} tickers", tickers.len());
                    let outcome = source.fetch_quotes(&tickers);
                    if let Err(e) = &outcome {
                        warn!("Quote fetch failed: {}", e);
                    }
                    FeedEvent::Quotes(outcome)
                }
                FeedRequest::Market => {
                    debug!("Fetching market summary");
                    let outcome = source.fetch_market();
                    if let Err(e) = &outcome {
                        warn!("Market fetch failed: {}", e);
                    }
                    FeedEvent::Market(outcome)
                }
                FeedRequest::Shutdown => break,
            };
            events
                .send(event)
                .map_err(|e| QuoteError::ChannelSend(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_common::TickerParser;
    use std::cell::Cell;

    struct StubSource {
        fail: bool,
        calls: Cell<usize>,
    }

    impl QuoteSource for StubSource {
        fn fetch_quotes(&self, tickers: &[Ticker]) -> Result<Vec<Stock>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(QuoteError::Fetch("offline".into()));
            }
            Ok(tickers
                .iter()
                .map(|t| Stock {
                    ticker: t.to_string(),
                    ..Stock::default()
                })
                .collect())
        }

        fn fetch_market(&self) -> Result<MarketSnapshot> {
            Ok(MarketSnapshot {
                open: true,
                indices: Vec::new(),
            })
        }
    }

    #[test]
    fn requests_are_answered_in_order_until_shutdown() {
        let source = StubSource { fail: false, calls: Cell::new(0) };
        let (request_tx, request_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();

        request_tx
            .send(FeedRequest::Quotes(Ticker::parse_list("AAPL IBM").unwrap()))
            .unwrap();
        request_tx.send(FeedRequest::Market).unwrap();
        request_tx.send(FeedRequest::Shutdown).unwrap();
        request_tx.send(FeedRequest::Market).unwrap();

        FeedWorker::serve(&source, request_rx, event_tx).unwrap();

        let events: Vec<FeedEvent> = event_rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            FeedEvent::Quotes(Ok(stocks)) => assert_eq!(stocks[1].ticker, "IBM"),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(events[1], FeedEvent::Market(Ok(_))));
    }

    #[test]
    fn fetch_errors_are_forwarded_not_fatal() {
        let source = StubSource { fail: true, calls: Cell::new(0) };
        let (request_tx, request_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();

        request_tx.send(FeedRequest::Quotes(Vec::new())).unwrap();
        request_tx.send(FeedRequest::Quotes(Vec::new())).unwrap();
        drop(request_tx);

        FeedWorker::serve(&source, request_rx, event_tx).unwrap();
        assert_eq!(source.calls.get(), 2);
        assert!(event_rx.try_iter().all(|e| matches!(e, FeedEvent::Quotes(Err(_)))));
    }

    #[test]
    fn spawned_worker_round_trip() {
        let source = StubSource { fail: false, calls: Cell::new(0) };
        let (request_tx, event_rx, handle) = FeedWorker::start(source);

        request_tx.send(FeedRequest::Market).unwrap();
        let event = event_rx.recv().unwrap();
        assert!(matches!(event, FeedEvent::Market(Ok(snapshot)) if snapshot.open));

        request_tx.send(FeedRequest::Shutdown).unwrap();
        handle.join().unwrap();
    }
}
