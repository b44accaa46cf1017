use crate::error::WorkbookError;
use chrono::NaiveDate;
use core_types::Frame;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

/// A named sheet: one header row followed by data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, header: Vec<String>) -> Self {
        Self {
            name: name.into(),
            header,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Lays a frame out with its date index in the first column.
    pub fn from_frame(name: impl Into<String>, index_label: &str, frame: &Frame) -> Self {
        let mut header = Vec::with_capacity(frame.n_cols() + 1);
        header.push(index_label.to_string());
        header.extend(frame.columns().iter().cloned());

        let mut sheet = Sheet::new(name, header);
        for (date, values) in frame.rows() {
            let mut row = Vec::with_capacity(values.len() + 1);
            row.push(Cell::Date(date));
            row.extend(values.iter().map(|v| Cell::from(*v)));
            sheet.push_row(row);
        }
        sheet
    }
}

/// Collects sheets and saves them as one `.xlsx` workbook.
#[derive(Debug, Default)]
pub struct WorkbookWriter {
    sheets: Vec<Sheet>,
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, sheet: Sheet) -> &mut Self {
        self.sheets.push(sheet);
        self
    }

    /// Writes every sheet in insertion order, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), WorkbookError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let header_format = Format::new().set_bold();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        let mut workbook = Workbook::new();
        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            for (col, title) in sheet.header.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, title, &header_format)?;
            }

            for (i, row) in sheet.rows.iter().enumerate() {
                let r = (i + 1) as u32;
                for (col, cell) in row.iter().enumerate() {
                    let c = col as u16;
                    match cell {
                        Cell::Empty => {}
                        // Excel has no representation for NaN or infinities.
                        Cell::Number(v) if !v.is_finite() => {}
                        Cell::Number(v) => {
                            worksheet.write_number(r, c, *v)?;
                        }
                        Cell::Text(s) => {
                            worksheet.write_string(r, c, s)?;
                        }
                        Cell::Date(d) => {
                            worksheet.write_datetime_with_format(r, c, d, &date_format)?;
                        }
                    }
                }
            }

            if sheet.rows.iter().any(|row| matches!(row.first(), Some(Cell::Date(_)))) {
                worksheet.set_column_width(0, 12)?;
            }
        }

        workbook.save(path)?;
        tracing::debug!(path = %path.display(), sheets = self.sheets.len(), "Workbook saved");
        Ok(())
    }
}
