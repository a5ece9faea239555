//! Event dispatcher: the main loop of the dashboard.
//!
//! Keyboard events (from the input pump), three timers and fetch results
//! (from the feed worker) are merged with crossbeam `select!` into one
//! stream that is handled on this thread only; nothing else mutates the
//! session.
//!
//! Focus:
//! - `Normal` runs the global commands; `q`, `Q` and Esc quit.
//! - While a line or column editor is open every key goes to it until it
//!   reports completion.
//! - The help screen swallows the next key and redraws the dashboard.
//!
//! Timer ticks are ignored while help is showing or the dashboard is paused;
//! resize always redraws.
use crossbeam_channel::{Receiver, select, tick};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use log::{debug, error, info};
use quote_common::QuoteError;
use quote_common::Result;
use quote_feed::FeedEvent;
use std::time::Duration;

use crate::column_editor::ColumnEditor;
use crate::dashboard::Dashboard;
use crate::line_editor::{Command, LineEditor};
use crate::surface::Surface;

/// Seconds between clock redraws.
const CLOCK_SECS: u64 = 1;

/// Periodic timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Redraw the clock.
    Clock,
    /// Refresh and redraw quotes.
    Quotes,
    /// Refresh and redraw the market summary.
    Market,
}

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum DashEvent {
    /// Terminal event from the input pump.
    Input(Event),
    /// Timer fired.
    Tick(Tick),
    /// Fetch result from the feed worker.
    Feed(FeedEvent),
}

/// Whether the main loop goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep going.
    Continue,
    /// Leave the main loop.
    Quit,
}

/// Who receives the next key.
enum Mode {
    Normal,
    LineEditing(LineEditor),
    ColumnEditing(ColumnEditor),
    ShowingHelp,
}

/// Owns the session and routes every event to the handler for the current
/// focus.
pub struct Dispatcher<S: Surface> {
    dashboard: Dashboard<S>,
    mode: Mode,
}

impl<S: Surface> Dispatcher<S> {
    pub fn new(dashboard: Dashboard<S>) -> Self {
        Self {
            dashboard,
            mode: Mode::Normal,
        }
    }

    #[cfg(test)]
    pub fn dashboard(&self) -> &Dashboard<S> {
        &self.dashboard
    }

    fn gated(&self) -> bool {
        self.dashboard.paused || matches!(self.mode, Mode::ShowingHelp)
    }

    /// First fetches and the initial full draw.
    pub fn start(&mut self) -> Result<()> {
        self.dashboard.refresh_market()?;
        self.dashboard.refresh_quotes()?;
        self.dashboard.draw_all()
    }

    /// Runs until the user quits. Returns an error if the terminal or one of
    /// the channels fails.
    pub fn run(mut self, input: Receiver<Event>, feed: Receiver<FeedEvent>) -> Result<()> {
        let clock = tick(Duration::from_secs(CLOCK_SECS));
        let quotes = tick(Duration::from_secs(self.dashboard.profile.quotes_refresh));
        let market = tick(Duration::from_secs(self.dashboard.profile.market_refresh));

        self.start()?;
        loop {
            let event = select! {
                recv(input) -> msg => match msg {
                    Ok(event) => DashEvent::Input(event),
                    Err(e) => return Err(QuoteError::ChannelRecv(format!("input: {}", e))),
                },
                recv(feed) -> msg => match msg {
                    Ok(event) => DashEvent::Feed(event),
                    Err(e) => return Err(QuoteError::ChannelRecv(format!("feed: {}", e))),
                },
                recv(clock) -> _ => DashEvent::Tick(Tick::Clock),
                recv(quotes) -> _ => DashEvent::Tick(Tick::Quotes),
                recv(market) -> _ => DashEvent::Tick(Tick::Market),
            };
            if self.handle(event)? == Flow::Quit {
                info!("Quit requested");
                break;
            }
        }
        self.dashboard.feed.shutdown();
        Ok(())
    }

    /// Handles one event.
    pub fn handle(&mut self, event: DashEvent) -> Result<Flow> {
        match event {
            DashEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                return self.handle_key(key);
            }
            DashEvent::Input(Event::Resize(width, height)) => {
                debug!("Resized to {}x{}", width, height);
                self.dashboard.screen.resize()?;
                if matches!(self.mode, Mode::ShowingHelp) {
                    self.dashboard.screen.draw_help()?;
                } else {
                    self.dashboard.draw_all()?;
                }
            }
            DashEvent::Input(_) => {}
            DashEvent::Tick(tick) => self.handle_tick(tick)?,
            DashEvent::Feed(event) => self.handle_feed(event)?,
        }
        Ok(Flow::Continue)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Flow> {
        if matches!(self.mode, Mode::Normal) {
            return self.handle_command(key);
        }
        let dashboard = &mut self.dashboard;
        let done = match &mut self.mode {
            Mode::Normal => false,
            Mode::LineEditing(editor) => editor.handle(key, dashboard)?,
            Mode::ColumnEditing(editor) => editor.handle(key, dashboard)?,
            Mode::ShowingHelp => {
                dashboard.screen.clear()?;
                dashboard.draw_all()?;
                true
            }
        };
        if done {
            self.mode = Mode::Normal;
        }
        Ok(Flow::Continue)
    }

    fn handle_command(&mut self, key: KeyEvent) -> Result<Flow> {
        let dashboard = &mut self.dashboard;
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(Flow::Quit),
            KeyCode::Char(c @ ('+' | '-' | 'f')) => {
                if let Some(command) = Command::from_char(c) {
                    self.mode = Mode::LineEditing(LineEditor::new(command, dashboard)?);
                }
            }
            KeyCode::Char('F') => match dashboard.profile.clear_filter() {
                Ok(()) => {
                    info!("Filter cleared");
                    dashboard.draw_quotes()?;
                }
                Err(e) => error!("Clearing filter failed: {}", e),
            },
            KeyCode::Char('o' | 'O') => {
                self.mode = Mode::ColumnEditing(ColumnEditor::new(dashboard)?);
            }
            KeyCode::Char('g' | 'G') => match dashboard.profile.regroup() {
                Ok(()) => dashboard.draw_quotes()?,
                Err(e) => error!("Regroup failed: {}", e),
            },
            KeyCode::Char('p' | 'P') => {
                dashboard.paused = !dashboard.paused;
                info!("{}", if dashboard.paused { "Paused" } else { "Resumed" });
                dashboard.screen.pause(dashboard.paused);
                dashboard.draw_time()?;
            }
            KeyCode::Char('?' | 'h' | 'H') => {
                self.mode = Mode::ShowingHelp;
                dashboard.screen.draw_help()?;
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn handle_tick(&mut self, tick: Tick) -> Result<()> {
        if self.gated() {
            return Ok(());
        }
        let dashboard = &mut self.dashboard;
        match tick {
            Tick::Clock => dashboard.draw_time(),
            Tick::Quotes => {
                dashboard.refresh_quotes()?;
                dashboard.draw_quotes()
            }
            Tick::Market => {
                dashboard.refresh_market()?;
                dashboard.draw_market()
            }
        }
    }

    fn handle_feed(&mut self, event: FeedEvent) -> Result<()> {
        let gated = self.gated();
        let dashboard = &mut self.dashboard;
        match event {
            FeedEvent::Quotes(outcome) => {
                if !dashboard.feed.quotes_landed() {
                    debug!("Dropping quotes fetched for a previous ticker set");
                    return dashboard.refresh_quotes();
                }
                dashboard.quotes.apply(outcome);
                if !gated {
                    dashboard.draw_quotes()?;
                }
            }
            FeedEvent::Market(outcome) => {
                dashboard.feed.market_landed();
                dashboard.market.apply(outcome);
                if !gated {
                    dashboard.draw_market()?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::{dashboard, dashboard_with, key, stock};
    use crate::layout::PROMPT_LINE;
    use crate::surface::testing::MemorySurface;
    use quote_common::column::Column;
    use quote_common::filter::Filter;
    use quote_common::market::{MarketIndex, MarketSnapshot};
    use quote_common::profile::Profile;
    use quote_feed::FeedRequest;

    fn dispatcher() -> (Dispatcher<MemorySurface>, Receiver<FeedRequest>) {
        started(dashboard())
    }

    fn started(
        (dashboard, requests): (Dashboard<MemorySurface>, Receiver<FeedRequest>),
    ) -> (Dispatcher<MemorySurface>, Receiver<FeedRequest>) {
        let mut dispatcher = Dispatcher::new(dashboard);
        dispatcher.start().unwrap();
        (dispatcher, requests)
    }

    fn press(dispatcher: &mut Dispatcher<MemorySurface>, code: KeyCode) -> Flow {
        dispatcher.handle(DashEvent::Input(Event::Key(key(code)))).unwrap()
    }

    fn flushes(dispatcher: &Dispatcher<MemorySurface>) -> usize {
        dispatcher.dashboard().screen.surface().flushes
    }

    #[test]
    fn start_requests_market_and_quotes() {
        let (_dispatcher, requests) = dispatcher();
        let sent: Vec<FeedRequest> = requests.try_iter().collect();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], FeedRequest::Market);
        assert!(matches!(sent[1], FeedRequest::Quotes(_)));
    }

    #[test]
    fn quit_keys_in_normal_mode() {
        for code in [KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')] {
            let (mut dispatcher, _requests) = dispatcher();
            assert_eq!(press(&mut dispatcher, code), Flow::Quit);
        }
    }

    #[test]
    fn q_is_typed_into_open_editor() {
        let (mut dispatcher, _requests) = dispatcher();
        assert_eq!(press(&mut dispatcher, KeyCode::Char('+')), Flow::Continue);
        assert_eq!(press(&mut dispatcher, KeyCode::Char('q')), Flow::Continue);
        match &dispatcher.mode {
            Mode::LineEditing(editor) => {
                assert_eq!(editor.command(), Command::AddTickers);
                assert_eq!(editor.input(), "q");
            }
            _ => panic!("line editor should still be open"),
        }

        assert_eq!(press(&mut dispatcher, KeyCode::Esc), Flow::Continue);
        assert!(matches!(dispatcher.mode, Mode::Normal));
        assert_eq!(dispatcher.dashboard().screen.surface().row(PROMPT_LINE).trim(), "");
        assert_eq!(press(&mut dispatcher, KeyCode::Char('q')), Flow::Quit);
    }

    #[test]
    fn key_release_is_ignored() {
        let (mut dispatcher, _requests) = dispatcher();
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        let flow = dispatcher.handle(DashEvent::Input(Event::Key(release))).unwrap();
        assert_eq!(flow, Flow::Continue);
    }

    #[test]
    fn paused_dashboard_ignores_ticks() {
        let (mut dispatcher, _requests) = dispatcher();
        press(&mut dispatcher, KeyCode::Char('p'));
        assert!(dispatcher.dashboard().paused);
        assert!(dispatcher.dashboard().screen.surface().contains("PAUSED"));

        let before = flushes(&dispatcher);
        for tick in [Tick::Clock, Tick::Quotes, Tick::Market] {
            dispatcher.handle(DashEvent::Tick(tick)).unwrap();
        }
        assert_eq!(flushes(&dispatcher), before);

        press(&mut dispatcher, KeyCode::Char('P'));
        assert!(!dispatcher.dashboard().paused);
        let before = flushes(&dispatcher);
        dispatcher.handle(DashEvent::Tick(Tick::Clock)).unwrap();
        assert!(flushes(&dispatcher) > before);
        assert!(!dispatcher.dashboard().screen.surface().contains("PAUSED"));
    }

    #[test]
    fn help_swallows_ticks_and_next_key() {
        let (mut dispatcher, _requests) = dispatcher();
        press(&mut dispatcher, KeyCode::Char('?'));
        assert!(matches!(dispatcher.mode, Mode::ShowingHelp));

        let before = flushes(&dispatcher);
        dispatcher.handle(DashEvent::Tick(Tick::Clock)).unwrap();
        assert_eq!(flushes(&dispatcher), before);

        assert_eq!(press(&mut dispatcher, KeyCode::Char('q')), Flow::Continue);
        assert!(matches!(dispatcher.mode, Mode::Normal));
        assert!(dispatcher.dashboard().screen.surface().contains("Ticker"));
    }

    #[test]
    fn resize_redraws_while_paused() {
        let (mut dispatcher, _requests) = dispatcher();
        press(&mut dispatcher, KeyCode::Char('p'));
        let flushes_before = flushes(&dispatcher);
        let clears_before = dispatcher.dashboard().screen.surface().clears;

        let flow = dispatcher.handle(DashEvent::Input(Event::Resize(160, 30))).unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(flushes(&dispatcher) > flushes_before);
        assert_eq!(dispatcher.dashboard().screen.surface().clears, clears_before + 1);
        assert!(dispatcher.dashboard().screen.surface().contains("PAUSED"));
        assert!(dispatcher.dashboard().screen.surface().contains("Ticker"));
    }

    #[test]
    fn resize_keeps_help_on_screen() {
        let (mut dispatcher, _requests) = dispatcher();
        press(&mut dispatcher, KeyCode::Char('h'));
        let flushes_before = flushes(&dispatcher);

        dispatcher.handle(DashEvent::Input(Event::Resize(160, 30))).unwrap();
        assert!(matches!(dispatcher.mode, Mode::ShowingHelp));
        assert!(flushes(&dispatcher) > flushes_before);
        let surface = dispatcher.dashboard().screen.surface();
        assert!(surface.contains("Press any key to continue"));
        assert!(!surface.contains("Ticker▲"));
    }

    #[test]
    fn column_editor_reorders_quotes() {
        let (mut dispatcher, _requests) = dispatcher();
        press(&mut dispatcher, KeyCode::Char('o'));
        assert!(matches!(dispatcher.mode, Mode::ColumnEditing(_)));

        press(&mut dispatcher, KeyCode::Right);
        press(&mut dispatcher, KeyCode::Enter);
        assert!(matches!(dispatcher.mode, Mode::ColumnEditing(_)));
        assert_eq!(dispatcher.dashboard().profile.sort_column, Column::LastTrade);
        assert!(dispatcher.dashboard().profile.ascending);

        press(&mut dispatcher, KeyCode::Enter);
        assert!(!dispatcher.dashboard().profile.ascending);

        assert_eq!(press(&mut dispatcher, KeyCode::Esc), Flow::Continue);
        assert!(matches!(dispatcher.mode, Mode::Normal));
        assert_eq!(dispatcher.dashboard().profile.selected_column, None);
    }

    #[test]
    fn clear_filter_key_removes_filter() {
        let mut profile = Profile::in_memory();
        profile.set_filter(Filter::new("last > 1").unwrap()).unwrap();
        let (mut dispatcher, _requests) = started(dashboard_with(profile));

        assert_eq!(press(&mut dispatcher, KeyCode::Char('F')), Flow::Continue);
        assert!(dispatcher.dashboard().profile.filter_expression().is_empty());
    }

    #[test]
    fn failed_saves_keep_dashboard_running() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moprc");
        let mut profile = Profile::load(&path).unwrap();
        profile.set_filter(Filter::new("last > 1").unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        let (mut dispatcher, _requests) = started(dashboard_with(profile));
        let grouped = dispatcher.dashboard().profile.grouped;

        assert_eq!(press(&mut dispatcher, KeyCode::Char('F')), Flow::Continue);
        assert_eq!(dispatcher.dashboard().profile.filter, "last > 1");
        assert_eq!(press(&mut dispatcher, KeyCode::Char('g')), Flow::Continue);
        assert_eq!(dispatcher.dashboard().profile.grouped, grouped);

        press(&mut dispatcher, KeyCode::Char('o'));
        press(&mut dispatcher, KeyCode::Right);
        assert_eq!(press(&mut dispatcher, KeyCode::Enter), Flow::Continue);
        assert_eq!(dispatcher.dashboard().profile.sort_column, Column::Ticker);
    }

    #[test]
    fn group_toggles_profile() {
        let (mut dispatcher, _requests) = dispatcher();
        let grouped = dispatcher.dashboard().profile.grouped;
        press(&mut dispatcher, KeyCode::Char('g'));
        assert_eq!(dispatcher.dashboard().profile.grouped, !grouped);
    }

    #[test]
    fn fetched_quotes_are_drawn() {
        let (mut dispatcher, _requests) = dispatcher();
        let rows = vec![stock("AAPL", "150.00"), stock("IBM", "140.00")];
        dispatcher
            .handle(DashEvent::Feed(FeedEvent::Quotes(Ok(rows))))
            .unwrap();
        assert_eq!(dispatcher.dashboard().quotes.stocks().len(), 2);
        assert!(dispatcher.dashboard().screen.surface().contains("150.00"));
    }

    #[test]
    fn stale_quotes_are_refetched() {
        let (mut dispatcher, requests) = dispatcher();
        requests.try_iter().count();

        press(&mut dispatcher, KeyCode::Char('+'));
        for c in "NVDA".chars() {
            press(&mut dispatcher, KeyCode::Char(c));
        }
        press(&mut dispatcher, KeyCode::Enter);
        assert!(requests.try_recv().is_err());

        dispatcher
            .handle(DashEvent::Feed(FeedEvent::Quotes(Ok(vec![stock("AAPL", "150.00")]))))
            .unwrap();
        assert!(dispatcher.dashboard().quotes.stocks().is_empty());
        match requests.try_recv().unwrap() {
            FeedRequest::Quotes(tickers) => {
                assert!(tickers.iter().any(|t| t.as_str() == "NVDA"));
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn market_snapshot_is_applied() {
        let (mut dispatcher, _requests) = dispatcher();
        let snapshot = MarketSnapshot {
            open: false,
            indices: vec![MarketIndex {
                label: "Dow".to_string(),
                latest: "33000.00".to_string(),
                change: "+120.00".to_string(),
                change_pct: "0.36%".to_string(),
                advancing: true,
            }],
        };
        dispatcher
            .handle(DashEvent::Feed(FeedEvent::Market(Ok(snapshot))))
            .unwrap();
        assert!(dispatcher.dashboard().market.is_closed());
        assert!(dispatcher.dashboard().screen.surface().contains("33000.00"));
    }
}
