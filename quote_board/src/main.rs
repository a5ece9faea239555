//! Quote Board: a terminal dashboard of live stock quotes and market
//! indicators.
//!
//! Usage example (CLI):
//! ```bash
//! quote_board --profile ~/.moprc --log-file /tmp/quote_board.log
//! ```
//!
//! The binary wires together:
//!
//! - `Profile` — tickers, sort order, grouping, filter and colors, persisted as
//!   JSON (default `~/.moprc`).
//! - `FeedWorker` — a background thread that fetches quotes and the market
//!   summary from Yahoo Finance so the screen never blocks on the network.
//! - `spawn_input_pump` — a thread that republishes terminal events.
//! - `Dispatcher` — the single-threaded `select!` loop that owns the session,
//!   routes keys to the active editor and redraws the `Screen`.
//!
//! Logging goes to the file given by `--log-file` (the terminal is taken over
//! by the dashboard); `RUST_LOG` tunes the level.
#![warn(missing_docs)]
mod args;
mod column_editor;
mod dashboard;
mod dispatcher;
mod input;
mod layout;
mod line_editor;
mod markup;
mod screen;
mod surface;

use crate::args::Args;
use crate::dashboard::{Dashboard, FeedLink};
use crate::dispatcher::Dispatcher;
use crate::input::spawn_input_pump;
use crate::markup::Markup;
use crate::screen::Screen;
use crate::surface::TerminalSurface;
use clap::Parser;
use crossbeam_channel::{Receiver, Sender};
use crossterm::execute;
use crossterm::terminal::{LeaveAlternateScreen, disable_raw_mode};
use log::{error, info};
use quote_common::QuoteError;
use quote_common::Result;
use quote_common::profile::Profile;
use quote_feed::{FeedEvent, FeedRequest, FeedWorker, YahooClient};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// Settings file name in the home directory.
const PROFILE_FILE: &str = ".moprc";

fn main() -> Result<(), QuoteError> {
    let args = Args::parse();
    let log_file = args.log_file.as_deref().map(normalize_path);
    init_logger(log_file.as_deref())?;

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let profile_path = match args.profile.as_deref() {
        Some(raw) => normalize_path(raw),
        None => default_profile_path()?,
    };
    let profile = Profile::load(&profile_path)?;
    info!(
        "Profile {} loaded: {} tickers",
        profile_path.display(),
        profile.tickers.len()
    );

    let (request_tx, feed_rx, worker) = FeedWorker::start(YahooClient::new()?);

    let outcome = run_dashboard(profile, request_tx, feed_rx);
    if worker.join().is_err() {
        error!("Feed worker panicked");
    }
    if let Err(e) = &outcome {
        error!("Dashboard stopped: {}", e);
    }
    info!("Bye");
    outcome
}

/// Owns the terminal for the lifetime of the dispatcher; the surface restores
/// it when dropped, before `main` reports any error.
fn run_dashboard(
    profile: Profile,
    requests: Sender<FeedRequest>,
    feed: Receiver<FeedEvent>,
) -> Result<()> {
    let markup = Markup::new(&profile.colors)?;
    let screen = Screen::new(TerminalSurface::open()?, markup)?;
    let feed_link = FeedLink::new(requests.clone());
    let input = spawn_input_pump();

    let outcome = Dispatcher::new(Dashboard::new(profile, screen, feed_link)).run(input, feed);
    if outcome.is_err() {
        let _ = requests.send(FeedRequest::Shutdown);
    }
    outcome
}

fn default_profile_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(PROFILE_FILE))
        .ok_or_else(|| QuoteError::Profile("cannot locate the home directory".into()))
}

/// Sends log records to `path`, or turns logging off when no file is given.
fn init_logger(path: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    match path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .filter_level(log::LevelFilter::Info)
                .parse_default_env()
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}
