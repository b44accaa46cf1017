use crate::error::FetchError;
use core_types::{StatementRecord, StockBundle};
use serde_json::Value;
use std::path::Path;
use workbook::{Cell, Sheet, WorkbookWriter};

pub const STOCK_DATA_FILE: &str = "stock_data.xlsx";

/// Writes a bundle as four sheets: `Info`, `Close`, `Finance` and `Cash`.
pub fn save_bundle(bundle: &StockBundle, path: &Path) -> Result<(), FetchError> {
    let mut info = Sheet::new("Info", header(&["Info", "Value", "Stock"]));
    for record in &bundle.info {
        info.push_row(vec![
            Cell::from(record.key.as_str()),
            json_cell(&record.value),
            Cell::from(record.stock.as_str()),
        ]);
    }

    let mut close = Sheet::new("Close", header(&["Date", "Close", "Stock"]));
    for record in &bundle.close {
        close.push_row(vec![
            Cell::from(record.date),
            Cell::from(record.close),
            Cell::from(record.stock.as_str()),
        ]);
    }

    let mut writer = WorkbookWriter::new();
    writer
        .add_sheet(info)
        .add_sheet(close)
        .add_sheet(statement_sheet("Finance", &bundle.financials))
        .add_sheet(statement_sheet("Cash", &bundle.cashflow));
    writer.save(path)?;

    tracing::info!(path = %path.display(), "Stock data written");
    Ok(())
}

fn statement_sheet(name: &str, records: &[StatementRecord]) -> Sheet {
    let mut sheet = Sheet::new(name, header(&["Stock", "Position", "Year", "Value"]));
    for record in records {
        sheet.push_row(vec![
            Cell::from(record.stock.as_str()),
            Cell::from(record.position.as_str()),
            Cell::from(record.year),
            Cell::from(record.value),
        ]);
    }
    sheet
}

fn header(titles: &[&str]) -> Vec<String> {
    titles.iter().map(|t| t.to_string()).collect()
}

/// Scalars map onto native cells; arrays and objects are written as JSON text.
fn json_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Bool(b) => Cell::Text(b.to_string()),
        Value::Number(n) => n.as_f64().map_or_else(|| Cell::Text(n.to_string()), Cell::Number),
        Value::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}
