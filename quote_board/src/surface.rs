//! Terminal surface: the few drawing primitives the screen needs.
//!
//! `TerminalSurface` drives the real terminal through crossterm (raw mode,
//! alternate screen, hidden cursor) and restores it on drop.

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{
    Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write, stdout};

/// Attribute bit: bold.
pub const ATTR_BOLD: u8 = 1 << 0;
/// Attribute bit: underline.
pub const ATTR_UNDERLINE: u8 = 1 << 1;
/// Attribute bit: reverse video.
pub const ATTR_REVERSE: u8 = 1 << 2;

/// Colors and attribute bits of a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Color,
    pub bg: Color,
    pub attributes: u8,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            fg: Color::Reset,
            bg: Color::Reset,
            attributes: 0,
        }
    }
}

/// Something the screen can draw on.
pub trait Surface {
    /// Width and height in cells.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Writes `text` starting at column `x` of row `y`.
    fn put_str(&mut self, x: u16, y: u16, text: &str, style: CellStyle) -> io::Result<()>;

    /// Blanks the whole surface.
    fn clear(&mut self) -> io::Result<()>;

    /// Makes everything written so far visible.
    fn flush(&mut self) -> io::Result<()>;
}

/// The process terminal, in raw mode on the alternate screen.
pub struct TerminalSurface {
    out: Stdout,
}

impl TerminalSurface {
    /// Switches the terminal into dashboard mode.
    pub fn open() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Self { out })
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = execute!(self.out, SetAttribute(Attribute::Reset), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn put_str(&mut self, x: u16, y: u16, text: &str, style: CellStyle) -> io::Result<()> {
        queue!(
            self.out,
            MoveTo(x, y),
            SetAttribute(Attribute::Reset),
            SetForegroundColor(style.fg),
            SetBackgroundColor(style.bg)
        )?;
        if style.attributes & ATTR_BOLD != 0 {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.attributes & ATTR_UNDERLINE != 0 {
            queue!(self.out, SetAttribute(Attribute::Underlined))?;
        }
        if style.attributes & ATTR_REVERSE != 0 {
            queue!(self.out, SetAttribute(Attribute::Reverse))?;
        }
        queue!(self.out, Print(text))
    }

    fn clear(&mut self) -> io::Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset), Clear(ClearType::All))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
