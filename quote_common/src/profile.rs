//! Persisted user settings: tracked tickers, sort order, grouping, filter,
//! refresh intervals and colors.
//!
//! The profile is the single mutable session record shared by the dispatcher
//! and the editors. Every mutation that the user makes is saved right away
//! as pretty-printed JSON; a profile without a path (used in tests) keeps
//! everything in memory.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::column::Column;
use crate::error::QuoteError;
use crate::filter::Filter;
use crate::result::Result;
use crate::tickers::Ticker;

/// Tickers tracked by a freshly created profile.
pub const DEFAULT_TICKERS: &[&str] = &["AAPL", "C", "GOOG", "IBM", "KO", "MSFT", "V"];
/// Default seconds between quote refreshes.
pub const QUOTES_REFRESH_SECS: u64 = 5;
/// Default seconds between market refreshes.
pub const MARKET_REFRESH_SECS: u64 = 12;

/// Color names for the semantic markup tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    /// Rows and indices that are advancing.
    pub gain: String,
    /// Rows and indices that are declining.
    pub loss: String,
    /// Labels in the market summary.
    pub tag: String,
    /// Table header.
    pub header: String,
    /// Clock in the top right corner.
    pub time: String,
    /// Prompts and notices.
    pub highlight: String,
    /// Market summary values.
    pub market: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            gain: "green".into(),
            loss: "red".into(),
            tag: "yellow".into(),
            header: "lightgray".into(),
            time: "lightgray".into(),
            highlight: "yellow".into(),
            market: "white".into(),
        }
    }
}

/// User settings and the transient column highlight of the column editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Tracked tickers in display order.
    pub tickers: Vec<Ticker>,
    /// Column the table is sorted by.
    pub sort_column: Column,
    /// Sort direction.
    pub ascending: bool,
    /// Show advancing rows before declining ones.
    pub grouped: bool,
    /// Filter expression text; empty means no filtering.
    pub filter: String,
    /// Seconds between quote refreshes.
    pub quotes_refresh: u64,
    /// Seconds between market refreshes.
    pub market_refresh: u64,
    /// Colors for the semantic markup tags.
    pub colors: ColorScheme,
    /// Column highlighted by the column editor; `None` while it is inactive.
    #[serde(skip)]
    pub selected_column: Option<Column>,
    #[serde(skip)]
    compiled_filter: Filter,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().filter_map(|s| s.parse().ok()).collect(),
            sort_column: Column::Ticker,
            ascending: true,
            grouped: false,
            filter: String::new(),
            quotes_refresh: QUOTES_REFRESH_SECS,
            market_refresh: MARKET_REFRESH_SECS,
            colors: ColorScheme::default(),
            selected_column: None,
            compiled_filter: Filter::default(),
            path: None,
        }
    }
}

impl Profile {
    /// A profile with default settings that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the profile from `path`, creating it with defaults when the file
    /// does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            info!("Profile {} not found, creating defaults", path.display());
            let profile = Self {
                path: Some(path.to_path_buf()),
                ..Self::default()
            };
            profile.save()?;
            return Ok(profile);
        }

        let text = fs::read_to_string(path)?;
        let mut profile: Profile = serde_json::from_str(&text)
            .map_err(|e| QuoteError::Profile(format!("{}: {}", path.display(), e)))?;
        profile.path = Some(path.to_path_buf());
        profile.quotes_refresh = profile.quotes_refresh.max(1);
        profile.market_refresh = profile.market_refresh.max(1);

        match Filter::new(&profile.filter) {
            Ok(filter) => profile.compiled_filter = filter,
            Err(e) => {
                warn!("Dropping unusable filter `{}`: {}", profile.filter, e);
                profile.filter.clear();
            }
        }
        info!("Profile loaded from {}", path.display());
        Ok(profile)
    }

    /// Writes the profile to its file, if it has one.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .map_err(|e| QuoteError::Profile(format!("{}: {}", path.display(), e)))?;
        debug!("Profile saved to {}", path.display());
        Ok(())
    }

    /// Applies `change` to a copy, saves the copy and only then adopts it,
    /// so a failed save leaves the profile as it was.
    fn update<T>(&mut self, change: impl FnOnce(&mut Self) -> T) -> Result<T> {
        let mut candidate = self.clone();
        let outcome = change(&mut candidate);
        candidate.save()?;
        *self = candidate;
        Ok(outcome)
    }

    /// Appends tickers that are not tracked yet. Returns how many were added.
    pub fn add_tickers(&mut self, tickers: &[Ticker]) -> Result<usize> {
        let mut fresh: Vec<Ticker> = Vec::new();
        for ticker in tickers {
            if !self.tickers.contains(ticker) && !fresh.contains(ticker) {
                fresh.push(ticker.clone());
            }
        }
        let added = fresh.len();
        if added > 0 {
            self.update(|profile| profile.tickers.extend(fresh))?;
        }
        Ok(added)
    }

    /// Stops tracking the given tickers. Returns how many were removed.
    pub fn remove_tickers(&mut self, tickers: &[Ticker]) -> Result<usize> {
        let removed = self.tickers.iter().filter(|t| tickers.contains(t)).count();
        if removed > 0 {
            self.update(|profile| profile.tickers.retain(|t| !tickers.contains(t)))?;
        }
        Ok(removed)
    }

    /// The compiled filter matching `self.filter`.
    pub fn filter_expression(&self) -> &Filter {
        &self.compiled_filter
    }

    /// Replaces the active filter with an already validated one.
    pub fn set_filter(&mut self, filter: Filter) -> Result<()> {
        self.update(|profile| {
            profile.filter = filter.expression().to_string();
            profile.compiled_filter = filter;
        })
    }

    /// Removes filtering.
    pub fn clear_filter(&mut self) -> Result<()> {
        self.set_filter(Filter::default())
    }

    /// Commits the column editor selection: the already active column flips
    /// the direction, any other column becomes active in ascending order.
    pub fn reorder(&mut self) -> Result<()> {
        let Some(selected) = self.selected_column else {
            return Err(QuoteError::Format("no column selected".into()));
        };
        self.update(|profile| {
            if selected == profile.sort_column {
                profile.ascending = !profile.ascending;
            } else {
                profile.sort_column = selected;
                profile.ascending = true;
            }
        })
    }

    /// Toggles advancing/declining grouping.
    pub fn regroup(&mut self) -> Result<()> {
        self.update(|profile| profile.grouped = !profile.grouped)
    }
}
