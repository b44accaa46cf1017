use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single daily close as returned by the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// A financial statement as returned by the provider: line items (rows) by
/// period-end dates (columns).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statement {
    pub line_items: Vec<String>,
    pub period_ends: Vec<NaiveDate>,
    /// `values[item][period]`
    pub values: Vec<Vec<Option<f64>>>,
}

impl Statement {
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty() || self.period_ends.is_empty()
    }
}

/// One key of a ticker's info snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoRecord {
    pub key: String,
    pub value: Value,
    pub stock: String,
}

/// One close price in long format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub stock: String,
}

/// One statement cell in long format, keyed by reporting year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRecord {
    pub stock: String,
    pub position: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// Everything fetched for a list of tickers, concatenated across tickers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StockBundle {
    pub info: Vec<InfoRecord>,
    pub close: Vec<CloseRecord>,
    pub financials: Vec<StatementRecord>,
    pub cashflow: Vec<StatementRecord>,
}
