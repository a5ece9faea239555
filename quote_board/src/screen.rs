//! Screen renders markup lines onto a terminal surface and knows where each
//! part of the dashboard lives.

use chrono::{DateTime, Local};
use crossterm::style::Color;
use quote_common::market::Market;
use quote_common::profile::Profile;
use quote_common::quote::Quotes;
use std::io;

use crate::layout::{self, HEADER_LINE, MARKET_LINE, PROMPT_LINE};
use crate::markup::Markup;
use crate::surface::{ATTR_REVERSE, CellStyle, Surface};

/// Markup renderer bound to one surface.
pub struct Screen<S: Surface> {
    surface: S,
    markup: Markup,
    width: u16,
    height: u16,
    paused: bool,
    clock: Option<String>,
}

impl<S: Surface> Screen<S> {
    /// Wraps `surface`, reading its current size.
    pub fn new(surface: S, markup: Markup) -> io::Result<Self> {
        let (width, height) = surface.size()?;
        Ok(Self {
            surface,
            markup,
            width,
            height,
            paused: false,
            clock: None,
        })
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Switches the clock slot between the time and the pause notice.
    pub fn pause(&mut self, paused: bool) -> &mut Self {
        self.paused = paused;
        self
    }

    /// Picks up the new terminal size and blanks the surface.
    pub fn resize(&mut self) -> io::Result<&mut Self> {
        let (width, height) = self.surface.size()?;
        self.width = width;
        self.height = height;
        self.clear()
    }

    /// Blanks the surface.
    pub fn clear(&mut self) -> io::Result<&mut Self> {
        self.surface.clear()?;
        Ok(self)
    }

    fn clear_line(&mut self, y: u16) -> io::Result<()> {
        if y >= self.height {
            return Ok(());
        }
        let blank = " ".repeat(self.width as usize);
        self.surface.put_str(0, y, &blank, CellStyle::default())
    }

    /// Draws one line of markup starting at column `x` of row `y`. Tags are
    /// consumed and never displayed; text inside `<right>` is placed against
    /// the right edge. The render state starts from defaults on every call.
    pub fn draw_line(&mut self, x: u16, y: u16, text: &str) -> io::Result<()> {
        if y >= self.height {
            return Ok(());
        }
        self.markup.reset();
        let mut column = x;

        for token in self.markup.tokenize(text) {
            if self.markup.is_tag(token) {
                continue;
            }
            let state = self.markup.state();
            let length = token.chars().count() as u16;
            let start = if state.right_aligned {
                self.width.saturating_sub(length)
            } else {
                let start = column;
                column = column.saturating_add(length);
                start
            };
            if start < self.width {
                self.surface.put_str(start, y, token, state.style())?;
            }
        }
        Ok(())
    }

    /// Draws an error message verbatim in the loss color; tag-like text in
    /// it is shown, not interpreted.
    fn draw_error(&mut self, y: u16, message: &str) -> io::Result<()> {
        if y >= self.height {
            return Ok(());
        }
        let style = self.markup.style_of("loss");
        self.surface.put_str(0, y, message, style)
    }

    /// Draws multi-line markup starting at row `y`.
    pub fn draw_text(&mut self, y: u16, text: &str) -> io::Result<()> {
        for (i, line) in text.lines().enumerate() {
            self.draw_line(0, y.saturating_add(i as u16), line)?;
        }
        Ok(())
    }

    /// Redraws the clock, or the pause notice while paused.
    pub fn draw_time(&mut self, now: DateTime<Local>) -> io::Result<()> {
        let clock = layout::time(now, self.paused);
        self.draw_line(0, MARKET_LINE, &clock)?;
        self.clock = Some(clock);
        self.surface.flush()
    }

    /// Redraws the market summary lines.
    pub fn draw_market(&mut self, market: &Market) -> io::Result<()> {
        for y in MARKET_LINE..PROMPT_LINE {
            self.clear_line(y)?;
        }
        match layout::market(market) {
            Ok(lines) => {
                for (i, line) in lines.iter().enumerate() {
                    self.draw_line(0, MARKET_LINE + i as u16, line)?;
                }
            }
            Err(error) => self.draw_error(MARKET_LINE, &error)?,
        }
        if let Some(clock) = self.clock.clone() {
            self.draw_line(0, MARKET_LINE, &clock)?;
        }
        self.surface.flush()
    }

    /// Redraws just the table header.
    pub fn draw_header(&mut self, profile: &Profile) -> io::Result<()> {
        self.clear_line(HEADER_LINE)?;
        self.draw_line(0, HEADER_LINE, &layout::header(profile))?;
        self.surface.flush()
    }

    /// Redraws the header and every quote row.
    pub fn draw_quotes(&mut self, profile: &Profile, quotes: &Quotes) -> io::Result<()> {
        for y in HEADER_LINE..self.height {
            self.clear_line(y)?;
        }
        self.draw_line(0, HEADER_LINE, &layout::header(profile))?;
        match layout::quotes(profile, quotes) {
            Ok(rows) => {
                for (i, line) in rows.iter().enumerate() {
                    self.draw_line(0, HEADER_LINE + 1 + i as u16, line)?;
                }
            }
            Err(error) => self.draw_error(HEADER_LINE + 1, &error)?,
        }
        self.surface.flush()
    }

    /// Redraws the whole dashboard.
    pub fn draw_all(
        &mut self,
        market: &Market,
        profile: &Profile,
        quotes: &Quotes,
        now: DateTime<Local>,
    ) -> io::Result<()> {
        self.draw_market(market)?;
        self.draw_time(now)?;
        self.draw_quotes(profile, quotes)
    }

    /// Replaces everything with the help text.
    pub fn draw_help(&mut self) -> io::Result<()> {
        self.clear()?;
        self.draw_text(0, layout::HELP)?;
        self.surface.flush()
    }

    /// Draws the line editor prompt: the label, the input with a reverse
    /// video cursor, and an optional error after it. User input is drawn
    /// verbatim so that `<` and `>` in filter expressions stay visible.
    pub fn draw_prompt(
        &mut self,
        label: &str,
        input: &[char],
        cursor: usize,
        error: Option<&str>,
    ) -> io::Result<()> {
        self.clear_line(PROMPT_LINE)?;
        self.draw_line(0, PROMPT_LINE, &layout::prompt(label))?;

        let x = label.chars().count() as u16;
        let text: String = input.iter().collect();
        self.surface.put_str(x, PROMPT_LINE, &text, CellStyle::default())?;

        let under_cursor = input.get(cursor).copied().unwrap_or(' ');
        let cursor_style = CellStyle {
            attributes: ATTR_REVERSE,
            ..CellStyle::default()
        };
        let cursor_x = x.saturating_add(cursor as u16);
        self.surface
            .put_str(cursor_x, PROMPT_LINE, &under_cursor.to_string(), cursor_style)?;

        if let Some(error) = error {
            let error_x = x.saturating_add(input.len() as u16 + 2);
            let error_style = CellStyle {
                fg: Color::DarkRed,
                ..CellStyle::default()
            };
            self.surface.put_str(error_x, PROMPT_LINE, error, error_style)?;
        }
        self.surface.flush()
    }

    /// Blanks the prompt line.
    pub fn clear_prompt(&mut self) -> io::Result<()> {
        self.clear_line(PROMPT_LINE)?;
        self.surface.flush()
    }
}
