//! The session: everything the dispatcher and the editors mutate, owned in
//! one place and lent to whichever of them handles the current event.

use chrono::Local;
use crossbeam_channel::Sender;
use log::{debug, info};
use quote_common::QuoteError;
use quote_common::Result;
use quote_common::market::Market;
use quote_common::profile::Profile;
use quote_common::quote::Quotes;
use quote_common::tickers::Ticker;
use quote_feed::FeedRequest;

use crate::screen::Screen;
use crate::surface::Surface;

/// Dispatcher side of the feed worker. Keeps at most one quote fetch and
/// one market fetch in flight.
pub struct FeedLink {
    requests: Sender<FeedRequest>,
    quotes_in_flight: bool,
    quotes_stale: bool,
    market_in_flight: bool,
}

impl FeedLink {
    pub fn new(requests: Sender<FeedRequest>) -> Self {
        Self {
            requests,
            quotes_in_flight: false,
            quotes_stale: false,
            market_in_flight: false,
        }
    }

    fn send(&self, request: FeedRequest) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|e| QuoteError::ChannelSend(e.to_string()))
    }

    /// Asks for quotes unless a fetch is already running.
    pub fn request_quotes(&mut self, tickers: &[Ticker]) -> Result<()> {
        if self.quotes_in_flight || tickers.is_empty() {
            return Ok(());
        }
        debug!("Requesting quotes for {} tickers", tickers.len());
        self.send(FeedRequest::Quotes(tickers.to_vec()))?;
        self.quotes_in_flight = true;
        Ok(())
    }

    /// Asks for quotes for a changed ticker set. A fetch that is already
    /// running is marked stale; its result will be dropped and the fetch
    /// repeated when it lands.
    pub fn force_quotes(&mut self, tickers: &[Ticker]) -> Result<()> {
        if self.quotes_in_flight {
            self.quotes_stale = true;
            return Ok(());
        }
        self.request_quotes(tickers)
    }

    /// Records that a quote fetch finished. Returns false if its result
    /// belongs to a ticker set that has changed since.
    pub fn quotes_landed(&mut self) -> bool {
        self.quotes_in_flight = false;
        !std::mem::take(&mut self.quotes_stale)
    }

    /// Asks for the market summary unless a fetch is already running.
    pub fn request_market(&mut self) -> Result<()> {
        if self.market_in_flight {
            return Ok(());
        }
        self.send(FeedRequest::Market)?;
        self.market_in_flight = true;
        Ok(())
    }

    /// Records that a market fetch finished.
    pub fn market_landed(&mut self) {
        self.market_in_flight = false;
    }

    /// Tells the worker to stop. Failure means it is gone already.
    pub fn shutdown(&self) {
        if self.send(FeedRequest::Shutdown).is_err() {
            debug!("Feed worker already stopped");
        }
    }
}

/// Session state plus the screen it is drawn on.
pub struct Dashboard<S: Surface> {
    pub profile: Profile,
    pub quotes: Quotes,
    pub market: Market,
    pub screen: Screen<S>,
    pub feed: FeedLink,
    pub paused: bool,
}

impl<S: Surface> Dashboard<S> {
    pub fn new(profile: Profile, screen: Screen<S>, feed: FeedLink) -> Self {
        Self {
            profile,
            quotes: Quotes::new(),
            market: Market::new(),
            screen,
            feed,
            paused: false,
        }
    }

    pub fn draw_all(&mut self) -> Result<()> {
        self.screen
            .draw_all(&self.market, &self.profile, &self.quotes, Local::now())?;
        Ok(())
    }

    pub fn draw_time(&mut self) -> Result<()> {
        self.screen.draw_time(Local::now())?;
        Ok(())
    }

    pub fn draw_market(&mut self) -> Result<()> {
        self.screen.draw_market(&self.market)?;
        Ok(())
    }

    pub fn draw_header(&mut self) -> Result<()> {
        self.screen.draw_header(&self.profile)?;
        Ok(())
    }

    pub fn draw_quotes(&mut self) -> Result<()> {
        self.screen.draw_quotes(&self.profile, &self.quotes)?;
        Ok(())
    }

    /// Requests quotes if they were never fetched or the market is open.
    pub fn refresh_quotes(&mut self) -> Result<()> {
        if self.quotes.needs_fetch(self.market.is_closed()) {
            self.feed.request_quotes(&self.profile.tickers)?;
        }
        Ok(())
    }

    /// Drops the current rows and fetches again for the new ticker set.
    pub fn force_refresh(&mut self) -> Result<()> {
        info!("Ticker set changed, refreshing {} tickers", self.profile.tickers.len());
        self.quotes.invalidate();
        self.feed.force_quotes(&self.profile.tickers)?;
        self.draw_quotes()
    }

    pub fn refresh_market(&mut self) -> Result<()> {
        self.feed.request_market()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use quote_common::TickerParser;

    #[test]
    fn one_quote_fetch_in_flight() {
        let (tx, rx) = unbounded();
        let mut feed = FeedLink::new(tx);
        let tickers = Ticker::parse_list("AAPL").unwrap();

        feed.request_quotes(&tickers).unwrap();
        feed.request_quotes(&tickers).unwrap();
        assert_eq!(rx.try_iter().count(), 1);

        assert!(feed.quotes_landed());
        feed.request_quotes(&tickers).unwrap();
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn forced_fetch_marks_running_fetch_stale() {
        let (tx, rx) = unbounded();
        let mut feed = FeedLink::new(tx);
        let old = Ticker::parse_list("AAPL").unwrap();
        let new = Ticker::parse_list("AAPL IBM").unwrap();

        feed.request_quotes(&old).unwrap();
        feed.force_quotes(&new).unwrap();
        assert_eq!(rx.try_iter().count(), 1);

        assert!(!feed.quotes_landed());
        feed.request_quotes(&new).unwrap();
        assert_eq!(rx.try_recv().unwrap(), FeedRequest::Quotes(new));
        assert!(feed.quotes_landed());
    }

    #[test]
    fn empty_ticker_set_is_not_fetched() {
        let (tx, rx) = unbounded();
        let mut feed = FeedLink::new(tx);
        feed.request_quotes(&[]).unwrap();
        assert!(rx.try_recv().is_err());
    }
}

/// Builders shared by the dispatcher and editor tests.
#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::markup::Markup;
    use crate::surface::testing::MemorySurface;
    use crossbeam_channel::{Receiver, unbounded};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use quote_common::quote::Stock;
    use std::fs;
    use tempfile::TempDir;

    pub fn dashboard() -> (Dashboard<MemorySurface>, Receiver<FeedRequest>) {
        dashboard_with(Profile::in_memory())
    }

    /// A dashboard whose profile file has been replaced by a directory, so
    /// every save fails.
    pub fn unwritable_dashboard(dir: &TempDir) -> (Dashboard<MemorySurface>, Receiver<FeedRequest>) {
        let path = dir.path().join("moprc");
        let profile = Profile::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        dashboard_with(profile)
    }

    pub fn dashboard_with(profile: Profile) -> (Dashboard<MemorySurface>, Receiver<FeedRequest>) {
        let markup = Markup::new(&profile.colors).unwrap();
        let screen = Screen::new(MemorySurface::new(160, 30), markup).unwrap();
        let (tx, rx) = unbounded();
        (Dashboard::new(profile, screen, FeedLink::new(tx)), rx)
    }

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn stock(ticker: &str, last: &str) -> Stock {
        Stock {
            ticker: ticker.to_string(),
            last_trade: last.to_string(),
            advancing: true,
            ..Stock::default()
        }
    }
}
