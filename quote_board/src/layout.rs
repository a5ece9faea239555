//! Turns the session state into markup lines for the screen.

use chrono::{DateTime, Local};
use quote_common::column::Column;
use quote_common::market::Market;
use quote_common::profile::Profile;
use quote_common::quote::{Quotes, Stock};
use quote_common::sorter::{group_stocks, sort_stocks};
use strum::IntoEnumIterator;

/// Row of the first market line.
pub const MARKET_LINE: u16 = 0;
/// Row of the line editor prompt.
pub const PROMPT_LINE: u16 = 3;
/// Row of the table header; quote rows follow it.
pub const HEADER_LINE: u16 = 4;

/// Width reserved for the clock in the top right corner.
const TIME_WIDTH: usize = 30;
/// Indices on the first market line; the rest go to the second.
const INDICES_PER_LINE: usize = 4;

pub const HELP: &str = "Quote Board -- live stock quotes in your terminal.

<u>Command</u>    <u>Description                                </u>
   +       Add stocks to the list.
   -       Remove stocks from the list.
   ?       Display this help screen.
   f       Set filtering expression.
   F       Unset filtering expression.
   g       Group stocks by advancing/declining issues.
   o       Change column sort order.
   p       Pause market data and stock updates.
   q       Quit.
  esc      Ditto.

Enter comma-delimited list of stock tickers when prompted.
Filter example: <highlight>last > 100 && advancing</>

<r> Press any key to continue </r>
";

/// Clock (or the pause notice) for the top right corner.
pub fn time(now: DateTime<Local>, paused: bool) -> String {
    let text = if paused {
        "PAUSED".to_string()
    } else {
        now.format("%a %b %e %l:%M:%S%p").to_string()
    };
    if paused {
        format!("<right><time><r>{:>width$}</r></></right>", text, width = TIME_WIDTH)
    } else {
        format!("<right><time>{:>width$}</></right>", text, width = TIME_WIDTH)
    }
}

/// Market summary: two lines of indices and a status line, or the fetch
/// error as plain text.
pub fn market(market: &Market) -> Result<Vec<String>, String> {
    if let Some(error) = market.error() {
        return Err(error.to_string());
    }

    let cells: Vec<String> = market
        .indices()
        .iter()
        .map(|index| {
            let color = if index.advancing { "gain" } else { "loss" };
            format!(
                "<tag>{}</> <market>{}</> <{}>{} ({}%)</>",
                index.label, index.latest, color, index.change, index.change_pct
            )
        })
        .collect();

    let (first, second) = cells.split_at(cells.len().min(INDICES_PER_LINE));
    let status = if market.is_closed() {
        "<highlight>U.S. markets closed</>".to_string()
    } else {
        String::new()
    };
    Ok(vec![first.join("  "), second.join("  "), status])
}

/// Table header. The sort column carries a direction arrow and the column
/// highlighted by the column editor is shown in reverse video.
pub fn header(profile: &Profile) -> String {
    let mut line = String::from("<header>");
    for column in Column::iter() {
        let mut title = column.title().to_string();
        if column == profile.sort_column {
            title.push(if profile.ascending { '▲' } else { '▼' });
        }
        let cell = column.pad(&title);
        if profile.selected_column == Some(column) {
            line.push_str(&format!("<r>{}</r>", cell));
        } else {
            line.push_str(&cell);
        }
    }
    line.push_str("</>");
    line
}

/// Quote rows after filtering, sorting and grouping, or the error that
/// replaces them. Errors may quote user input, so they are plain text and
/// never markup.
pub fn quotes(profile: &Profile, quotes: &Quotes) -> Result<Vec<String>, String> {
    if let Some(error) = quotes.error() {
        return Err(error.to_string());
    }

    let mut stocks = profile
        .filter_expression()
        .apply(quotes.stocks())
        .map_err(|e| e.to_string())?;
    sort_stocks(&mut stocks, profile.sort_column, profile.ascending);
    if profile.grouped {
        stocks = group_stocks(stocks);
    }

    if stocks.is_empty() && !quotes.is_fetched() && !profile.tickers.is_empty() {
        return Ok(vec!["<highlight>Fetching quotes...</>".to_string()]);
    }
    Ok(stocks.iter().map(row).collect())
}

fn row(stock: &Stock) -> String {
    let color = if stock.advancing { "gain" } else { "loss" };
    let cells: String = Column::iter()
        .map(|column| column.pad(&cell_text(column, stock)))
        .collect();
    format!("<{}>{}</>", color, cells)
}

fn cell_text(column: Column, stock: &Stock) -> String {
    let value = column.value(stock).trim();
    if value.is_empty() || value == "N/A" {
        return "-".to_string();
    }
    match column {
        Column::ChangePct | Column::Yield if !value.ends_with('%') => format!("{}%", value),
        _ => value.to_string(),
    }
}

/// Prompt label of the line editor.
pub fn prompt(label: &str) -> String {
    format!("<highlight><b>{}</b></>", label)
}
