use chrono::{Datelike, Duration, NaiveDate};
use core_types::{Statement, StatementRecord};

/// Days a period-end date is shifted back before its year is taken.
pub const FISCAL_YEAR_SHIFT_DAYS: i64 = 15;

/// The reporting year of a statement column.
///
/// Fiscal years that close in the first days of a calendar year belong to the
/// previous year: a period ending 2021-01-10 reports 2020.
pub fn fiscal_year(period_end: NaiveDate) -> i32 {
    (period_end - Duration::days(FISCAL_YEAR_SHIFT_DAYS)).year()
}

/// Unpivots a statement into `(stock, line item, year, value)` rows.
///
/// Rows are emitted period by period: every line item of the first period
/// column, then every line item of the next.
pub fn melt_statement(stock: &str, statement: &Statement) -> Vec<StatementRecord> {
    let mut records = Vec::with_capacity(statement.line_items.len() * statement.period_ends.len());
    for (period, period_end) in statement.period_ends.iter().enumerate() {
        let year = fiscal_year(*period_end);
        for (item, position) in statement.line_items.iter().enumerate() {
            records.push(StatementRecord {
                stock: stock.to_string(),
                position: position.clone(),
                year,
                value: statement
                    .values
                    .get(item)
                    .and_then(|row| row.get(period))
                    .copied()
                    .flatten(),
            });
        }
    }
    records
}
