//! Columns of the quotes table.

use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};

use crate::quote::Stock;

/// A column of the quotes table, in display order.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    Hash,
    Eq,
    PartialEq,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumCount,
)]
pub enum Column {
    #[default]
    Ticker,
    LastTrade,
    Change,
    ChangePct,
    Open,
    Low,
    High,
    Low52,
    High52,
    Volume,
    AvgVolume,
    PeRatio,
    Dividend,
    Yield,
    MarketCap,
}

impl Column {
    /// Number of columns in the table.
    pub const TOTAL: usize = Column::COUNT;

    /// Position of the column in the table, `0..TOTAL`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column at the given position, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Column::iter().nth(index)
    }

    /// Header title.
    pub fn title(self) -> &'static str {
        match self {
            Column::Ticker => "Ticker",
            Column::LastTrade => "Last",
            Column::Change => "Change",
            Column::ChangePct => "Change%",
            Column::Open => "Open",
            Column::Low => "Low",
            Column::High => "High",
            Column::Low52 => "52w Low",
            Column::High52 => "52w High",
            Column::Volume => "Volume",
            Column::AvgVolume => "AvgVolume",
            Column::PeRatio => "P/E",
            Column::Dividend => "Dividend",
            Column::Yield => "Yield",
            Column::MarketCap => "MktCap",
        }
    }

    /// Display width including the leading gap.
    pub fn width(self) -> usize {
        match self {
            Column::Ticker => 8,
            Column::Volume | Column::AvgVolume | Column::MarketCap => 11,
            Column::PeRatio | Column::Dividend | Column::Yield => 9,
            _ => 10,
        }
    }

    /// Ticker is the only left-aligned column.
    pub fn is_left_aligned(self) -> bool {
        self == Column::Ticker
    }

    /// The raw text this column shows for `stock`.
    pub fn value(self, stock: &Stock) -> &str {
        match self {
            Column::Ticker => &stock.ticker,
            Column::LastTrade => &stock.last_trade,
            Column::Change => &stock.change,
            Column::ChangePct => &stock.change_pct,
            Column::Open => &stock.open,
            Column::Low => &stock.low,
            Column::High => &stock.high,
            Column::Low52 => &stock.low52,
            Column::High52 => &stock.high52,
            Column::Volume => &stock.volume,
            Column::AvgVolume => &stock.avg_volume,
            Column::PeRatio => &stock.pe_ratio,
            Column::Dividend => &stock.dividend,
            Column::Yield => &stock.dividend_yield,
            Column::MarketCap => &stock.market_cap,
        }
    }

    /// Pads `text` to the column width using the column's alignment.
    pub fn pad(self, text: &str) -> String {
        let width = self.width();
        if self.is_left_aligned() {
            format!("{:<width$}", text)
        } else {
            format!("{:>width$}", text)
        }
    }
}
