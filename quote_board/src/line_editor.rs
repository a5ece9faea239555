//! Line editor: a one-line input prompt for adding and removing tickers and
//! for entering the filter expression. It owns the keyboard until Enter
//! commits valid input or Esc cancels.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};
use quote_common::QuoteError;
use quote_common::Result;
use quote_common::filter::Filter;
use quote_common::quote::Stock;
use quote_common::tickers::{Ticker, TickerParser};

use crate::dashboard::Dashboard;
use crate::surface::Surface;

/// What the entered line is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    AddTickers,
    RemoveTickers,
    SetFilter,
}

impl Command {
    /// Command bound to a key in normal mode.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Command::AddTickers),
            '-' => Some(Command::RemoveTickers),
            'f' => Some(Command::SetFilter),
            _ => None,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Command::AddTickers => "Add tickers: ",
            Command::RemoveTickers => "Remove tickers: ",
            Command::SetFilter => "Set filter: ",
        }
    }
}

pub struct LineEditor {
    command: Command,
    input: Vec<char>,
    cursor: usize,
    error: Option<String>,
}

impl LineEditor {
    /// Opens the prompt. The filter prompt starts with the current filter.
    pub fn new<S: Surface>(command: Command, dashboard: &mut Dashboard<S>) -> Result<Self> {
        let input: Vec<char> = match command {
            Command::SetFilter => dashboard.profile.filter.chars().collect(),
            _ => Vec::new(),
        };
        let editor = Self {
            command,
            cursor: input.len(),
            input,
            error: None,
        };
        info!("Line editor opened: {:?}", command);
        editor.redraw(dashboard)?;
        Ok(editor)
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn input(&self) -> String {
        self.input.iter().collect()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Handles one key. Returns true when the editor is done.
    pub fn handle<S: Surface>(&mut self, key: KeyEvent, dashboard: &mut Dashboard<S>) -> Result<bool> {
        match key.code {
            KeyCode::Esc => {
                info!("Line editor cancelled");
                dashboard.screen.clear_prompt()?;
                return Ok(true);
            }
            KeyCode::Enter => match self.execute(dashboard) {
                Ok(()) => {
                    info!("Line editor committed {:?}: {}", self.command, self.input());
                    dashboard.screen.clear_prompt()?;
                    return Ok(true);
                }
                Err(e) if is_input_error(&e) => {
                    warn!("Rejected {:?} input `{}`: {}", self.command, self.input(), e);
                    self.error = Some(e.to_string());
                }
                Err(e) => return Err(e),
            },
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.input.remove(self.cursor);
                }
                self.error = None;
            }
            KeyCode::Delete => {
                if self.cursor < self.input.len() {
                    self.input.remove(self.cursor);
                }
                self.error = None;
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.input.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.len(),
            KeyCode::Char(c)
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.input.insert(self.cursor, c);
                self.cursor += 1;
                self.error = None;
            }
            _ => {}
        }
        self.redraw(dashboard)?;
        Ok(false)
    }

    fn redraw<S: Surface>(&self, dashboard: &mut Dashboard<S>) -> Result<()> {
        dashboard.screen.draw_prompt(
            self.command.prompt(),
            &self.input,
            self.cursor,
            self.error.as_deref(),
        )?;
        Ok(())
    }

    fn execute<S: Surface>(&self, dashboard: &mut Dashboard<S>) -> Result<()> {
        let text = self.input();
        match self.command {
            Command::AddTickers => {
                let tickers = Ticker::parse_list(&text)?;
                if dashboard.profile.add_tickers(&tickers)? > 0 {
                    dashboard.force_refresh()?;
                }
            }
            Command::RemoveTickers => {
                let tickers = Ticker::parse_list(&text)?;
                if dashboard.profile.remove_tickers(&tickers)? > 0 {
                    dashboard.force_refresh()?;
                }
            }
            Command::SetFilter => {
                let filter = Filter::new(&text)?;
                filter.matches(&Stock::default())?;
                filter.apply(dashboard.quotes.stocks())?;
                dashboard.profile.set_filter(filter)?;
                dashboard.draw_quotes()?;
            }
        }
        Ok(())
    }
}

/// Errors the user can react to: bad input, or settings that could not be
/// saved (nothing is applied then). The editor stays open for them.
fn is_input_error(err: &QuoteError) -> bool {
    matches!(
        err,
        QuoteError::InvalidTicker(_)
            | QuoteError::Filter(_)
            | QuoteError::FilterNotBoolean(_)
            | QuoteError::Profile(_)
    )
}
