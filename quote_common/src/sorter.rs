//! Ordering of stock rows by column and grouping by advancing/declining.

use std::cmp::Ordering;

use crate::column::Column;
use crate::quote::Stock;

/// Converts display text such as `$1,234.5`, `-0.75%` or `2.301B` into a
/// comparable number. Text that is not a number (`N/A`, empty) yields 0.
pub fn parse_amount(text: &str) -> f64 {
    let trimmed = text.trim();
    let (digits, multiplier) = match trimmed.chars().last() {
        Some('K') => (&trimmed[..trimmed.len() - 1], 1.0e3),
        Some('M') => (&trimmed[..trimmed.len() - 1], 1.0e6),
        Some('B') => (&trimmed[..trimmed.len() - 1], 1.0e9),
        Some('T') => (&trimmed[..trimmed.len() - 1], 1.0e12),
        _ => (trimmed, 1.0),
    };
    let cleaned: String = digits
        .chars()
        .filter(|c| !matches!(c, '$' | '%' | ',' | '+') && !c.is_whitespace())
        .collect();

    cleaned.parse::<f64>().map(|v| v * multiplier).unwrap_or(0.0)
}

/// Sorts rows in place by `column`. Ticker compares as text, every other
/// column numerically. The sort is stable.
pub fn sort_stocks(stocks: &mut [Stock], column: Column, ascending: bool) {
    stocks.sort_by(|a, b| {
        let ordering = compare(column, a, b);
        if ascending { ordering } else { ordering.reverse() }
    });
}

/// Moves advancing rows ahead of declining ones, keeping relative order.
pub fn group_stocks(stocks: Vec<Stock>) -> Vec<Stock> {
    let (mut advancing, declining): (Vec<Stock>, Vec<Stock>) =
        stocks.into_iter().partition(|s| s.advancing);
    advancing.extend(declining);
    advancing
}

fn compare(column: Column, a: &Stock, b: &Stock) -> Ordering {
    match column {
        Column::Ticker => a.ticker.cmp(&b.ticker),
        _ => parse_amount(column.value(a)).total_cmp(&parse_amount(column.value(b))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(ticker: &str, last: &str, advancing: bool) -> Stock {
        Stock {
            ticker: ticker.to_string(),
            last_trade: last.to_string(),
            advancing,
            ..Stock::default()
        }
    }

    fn tickers(stocks: &[Stock]) -> Vec<&str> {
        stocks.iter().map(|s| s.ticker.as_str()).collect()
    }

    #[test]
    fn amounts_understand_suffixes_and_symbols() {
        assert_eq!(parse_amount("2.5B"), 2.5e9);
        assert_eq!(parse_amount("$1,200.50"), 1200.5);
        assert_eq!(parse_amount("-0.75%"), -0.75);
        assert_eq!(parse_amount("+3"), 3.0);
        assert_eq!(parse_amount("N/A"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
    }

    #[test]
    fn numeric_columns_do_not_sort_lexically() {
        let mut stocks = vec![stock("A", "9.5", true), stock("B", "100", true), stock("C", "25", true)];
        sort_stocks(&mut stocks, Column::LastTrade, true);
        assert_eq!(tickers(&stocks), vec!["A", "C", "B"]);

        sort_stocks(&mut stocks, Column::LastTrade, false);
        assert_eq!(tickers(&stocks), vec!["B", "C", "A"]);
    }

    #[test]
    fn grouping_is_stable() {
        let stocks = vec![
            stock("A", "1", false),
            stock("B", "1", true),
            stock("C", "1", false),
            stock("D", "1", true),
        ];
        assert_eq!(tickers(&group_stocks(stocks)), vec!["B", "D", "A", "C"]);
    }
}
