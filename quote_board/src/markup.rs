//! Markup implements minimalistic text formatting conventions that get
//! translated to terminal colors and attributes. To colorize a string wrap
//! it in `<color-name>...</>` tags. Unlike HTML each color tag sets a new
//! color, and `</>` changes the color back to default:
//!
//! ```text
//! <green>Hello, <red>world!</>
//! ```
//!
//! Attributes go inside a color: `<b>...</b>` for bold, `<u>...</u>` for
//! underline and `<r>...</r>` for reverse. Unlike colors, attributes need
//! their matching closing tag. Color and attributes share one state word,
//! so opening or closing a color clears the attributes as well.
//! `<right>...</right>` right-aligns the enclosed text on the current line.
//!
//! Besides the plain color names the vocabulary has semantic aliases
//! (`gain`, `loss`, `tag`, `header`, `time`, `highlight`, `market`, `base`)
//! whose colors come from the profile.

use crossterm::style::Color;
use log::warn;
use quote_common::QuoteError;
use quote_common::Result;
use quote_common::profile::ColorScheme;
use regex::Regex;
use std::collections::HashMap;

use crate::surface::{ATTR_BOLD, ATTR_REVERSE, ATTR_UNDERLINE, CellStyle};

/// Layout directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Right-align the rest of the line.
    Right,
}

/// What a tag name stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Replace the foreground color.
    Color(Color),
    /// Toggle one attribute bit.
    Attribute(u8),
    /// Change the layout of what follows.
    Layout(Layout),
}

/// Styling accumulated while walking the tokens of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    pub foreground: Color,
    pub attributes: u8,
    pub right_aligned: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            foreground: Color::Reset,
            attributes: 0,
            right_aligned: false,
        }
    }
}

impl RenderState {
    /// Cell style for text drawn in this state.
    pub fn style(&self) -> CellStyle {
        CellStyle {
            fg: self.foreground,
            bg: Color::Reset,
            attributes: self.attributes,
        }
    }
}

/// Terminal color for a color name, e.g. `lightblue`.
pub fn color_by_name(name: &str) -> Option<Color> {
    let color = match name {
        "black" => Color::Black,
        "blue" => Color::DarkBlue,
        "cyan" => Color::DarkCyan,
        "darkgray" => Color::DarkGrey,
        "default" => Color::Reset,
        "green" => Color::DarkGreen,
        "lightblue" => Color::Blue,
        "lightcyan" => Color::Cyan,
        "lightgray" => Color::Grey,
        "lightgreen" => Color::Green,
        "lightmagenta" => Color::Magenta,
        "lightred" => Color::Red,
        "lightyellow" => Color::Yellow,
        "magenta" => Color::DarkMagenta,
        "red" => Color::DarkRed,
        "white" => Color::White,
        "yellow" => Color::DarkYellow,
        _ => return None,
    };
    Some(color)
}

const COLOR_NAMES: &[&str] = &[
    "black", "blue", "cyan", "darkgray", "default", "green", "lightblue", "lightcyan",
    "lightgray", "lightgreen", "lightmagenta", "lightred", "lightyellow", "magenta", "red",
    "white", "yellow",
];

/// Tag vocabulary, tokenizer and the running render state.
pub struct Markup {
    tags: HashMap<String, Tag>,
    pattern: Regex,
    state: RenderState,
}

impl Markup {
    /// Builds the tag vocabulary for `colors` and compiles the tag pattern.
    pub fn new(colors: &ColorScheme) -> Result<Self> {
        let mut tags: HashMap<String, Tag> = HashMap::new();

        for name in COLOR_NAMES {
            if let Some(color) = color_by_name(name) {
                tags.insert(name.to_string(), Tag::Color(color));
            }
        }
        let aliases = [
            ("gain", &colors.gain),
            ("loss", &colors.loss),
            ("tag", &colors.tag),
            ("header", &colors.header),
            ("time", &colors.time),
            ("highlight", &colors.highlight),
            ("market", &colors.market),
        ];
        for (alias, name) in aliases {
            let color = color_by_name(name).unwrap_or_else(|| {
                warn!("Unknown color `{}` for <{}>, using default", name, alias);
                Color::Reset
            });
            tags.insert(alias.to_string(), Tag::Color(color));
        }
        tags.insert("base".into(), Tag::Color(Color::White));
        tags.insert("/".into(), Tag::Color(Color::Reset));
        tags.insert("b".into(), Tag::Attribute(ATTR_BOLD));
        tags.insert("u".into(), Tag::Attribute(ATTR_UNDERLINE));
        tags.insert("r".into(), Tag::Attribute(ATTR_REVERSE));
        tags.insert("right".into(), Tag::Layout(Layout::Right));

        let pattern = Self::supported_tags(&tags)?;
        Ok(Self {
            tags,
            pattern,
            state: RenderState::default(),
        })
    }

    /// Regular expression matching every known tag, i.e.
    /// `</?black>|</?red>| ... |</?b>| ... |</?right>`.
    fn supported_tags(tags: &HashMap<String, Tag>) -> Result<Regex> {
        let mut names: Vec<&String> = tags.keys().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

        let alternation: Vec<String> = names
            .iter()
            .map(|name| format!("</?{}>", regex::escape(name)))
            .collect();
        Regex::new(&alternation.join("|")).map_err(|e| QuoteError::Format(e.to_string()))
    }

    /// Style of text that follows the opening tag `name` on a fresh line.
    pub fn style_of(&self, name: &str) -> CellStyle {
        let mut state = RenderState::default();
        match self.tags.get(name) {
            Some(Tag::Color(color)) => state.foreground = *color,
            Some(Tag::Attribute(bit)) => state.attributes = *bit,
            _ => {}
        }
        state.style()
    }

    /// Current render state.
    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Back to default color, no attributes, left alignment.
    pub fn reset(&mut self) {
        self.state = RenderState::default();
    }

    /// Splits `text` like `str::split` would, except the tags are kept as
    /// tokens of their own. `"<green>Hello, <red>world!</>"` becomes
    /// `["<green>", "Hello, ", "<red>", "world!", "</>"]`. Empty text runs
    /// are dropped.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut tokens = Vec::new();
        let mut head = 0;

        for found in self.pattern.find_iter(text) {
            if found.start() > head {
                tokens.push(&text[head..found.start()]);
            }
            tokens.push(found.as_str());
            head = found.end();
        }
        if head < text.len() {
            tokens.push(&text[head..]);
        }
        tokens
    }

    /// Returns true when `token` looks like a tag. Known tag names update
    /// the render state; unknown ones are still tags and are not displayed.
    pub fn is_tag(&mut self, token: &str) -> bool {
        match split_tag(token) {
            Some((name, open)) => {
                self.process(name, open);
                true
            }
            None => false,
        }
    }

    fn process(&mut self, name: &str, open: bool) {
        let Some(tag) = self.tags.get(name).copied() else {
            return;
        };
        match tag {
            Tag::Layout(Layout::Right) => self.state.right_aligned = open,
            Tag::Attribute(bit) => {
                if open {
                    self.state.attributes |= bit;
                } else {
                    self.state.attributes &= !bit;
                }
            }
            Tag::Color(color) => {
                self.state.foreground = if open { color } else { Color::Reset };
                self.state.attributes = 0;
            }
        }
    }
}

fn split_tag(token: &str) -> Option<(&str, bool)> {
    let bytes = token.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'<' && bytes[bytes.len() - 1] == b'>' {
        return Some((extract_tag_name(token), bytes[1] != b'/'));
    }
    None
}

/// Extracts the tag name from the given tag, i.e. `<hello>` => `hello`,
/// `</hello>` => `hello` and `</>` => `/`.
fn extract_tag_name(token: &str) -> &str {
    let bytes = token.as_bytes();
    if bytes.len() < 3 {
        ""
    } else if bytes[1] != b'/' {
        &token[1..token.len() - 1]
    } else if bytes.len() > 3 {
        &token[2..token.len() - 1]
    } else {
        "/"
    }
}
