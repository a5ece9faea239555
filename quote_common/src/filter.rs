//! Filter evaluator: keeps the stock rows for which a boolean expression over
//! named fields holds.
//!
//! Each row is projected into a variable context (`ticker`, `last`, `change`,
//! `changePercent`, `open`, `low`, `high`, `low52`, `high52`, `volume`,
//! `avgVolume`, `pe`, `peX`, `dividend`, `yield`, `mktCap`, `mktCapX`,
//! `advancing`) and the expression is evaluated by `evalexpr`. For example:
//!
//! ```text
//! last > 100 && advancing
//! ticker == "AAPL" || changePercent < -2
//! ```
//!
//! Any evaluation failure aborts the whole pass, so a filter never yields a
//! partial result.

use evalexpr::{ContextWithMutableVariables, HashMapContext, Node, Value, build_operator_tree};

use crate::error::QuoteError;
use crate::quote::Stock;
use crate::result::Result;
use crate::sorter::parse_amount;

/// A compiled filter expression. The empty expression passes every row.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    source: String,
    tree: Option<Node>,
}

impl Filter {
    /// Compiles `expression`. Blank input produces the pass-through filter.
    pub fn new(expression: &str) -> Result<Self> {
        let source = expression.trim();
        if source.is_empty() {
            return Ok(Self::default());
        }

        let tree = build_operator_tree(source)?;
        Ok(Self {
            source: source.to_string(),
            tree: Some(tree),
        })
    }

    /// The expression text as entered (trimmed).
    pub fn expression(&self) -> &str {
        &self.source
    }

    /// True for the pass-through filter.
    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    /// Builds the variable context for one row.
    pub fn bindings(stock: &Stock) -> Result<HashMapContext> {
        let mut context = HashMapContext::new();
        let numbers = [
            ("last", &stock.last_trade),
            ("change", &stock.change),
            ("changePercent", &stock.change_pct),
            ("open", &stock.open),
            ("low", &stock.low),
            ("high", &stock.high),
            ("low52", &stock.low52),
            ("high52", &stock.high52),
            ("volume", &stock.volume),
            ("avgVolume", &stock.avg_volume),
            ("pe", &stock.pe_ratio),
            ("peX", &stock.pe_ratio_x),
            ("dividend", &stock.dividend),
            ("yield", &stock.dividend_yield),
            ("mktCap", &stock.market_cap),
            ("mktCapX", &stock.market_cap_x),
        ];

        context.set_value("ticker".into(), Value::String(stock.ticker.trim().to_string()))?;
        for (name, text) in numbers {
            context.set_value(name.into(), Value::Float(parse_amount(text)))?;
        }
        context.set_value("advancing".into(), Value::Boolean(stock.advancing))?;
        Ok(context)
    }

    /// Evaluates the filter against one row.
    pub fn matches(&self, stock: &Stock) -> Result<bool> {
        let Some(tree) = &self.tree else {
            return Ok(true);
        };

        let context = Self::bindings(stock)?;
        match tree.eval_with_context(&context)? {
            Value::Boolean(truthy) => Ok(truthy),
            _ => Err(QuoteError::FilterNotBoolean(self.source.clone())),
        }
    }

    /// Returns the rows that pass, in their original order. Fails without a
    /// result if the expression cannot be evaluated on any row.
    pub fn apply(&self, stocks: &[Stock]) -> Result<Vec<Stock>> {
        if self.is_empty() {
            return Ok(stocks.to_vec());
        }

        let mut filtered = Vec::new();
        for stock in stocks {
            if self.matches(stock)? {
                filtered.push(stock.clone());
            }
        }
        Ok(filtered)
    }
}
