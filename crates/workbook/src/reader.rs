use crate::error::WorkbookError;
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use chrono::{Days, NaiveDate};
use core_types::Frame;
use std::path::Path;

/// Reads a sheet laid out by `Sheet::from_frame` back into a frame.
///
/// The first column holds the date index and the header row holds the column
/// names. Blank cells become missing values.
pub fn read_frame(path: &Path, sheet: &str) -> Result<Frame, WorkbookError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook.worksheet_range(sheet)?;
    frame_from_range(sheet, &range)
}

/// Reads every date in the column titled `column` of the first sheet.
///
/// Blank cells are skipped; any other non-date cell is an error.
pub fn read_date_column(path: &Path, column: &str) -> Result<Vec<NaiveDate>, WorkbookError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| WorkbookError::EmptySheet(path.display().to_string()))?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| WorkbookError::EmptySheet(sheet.clone()))?;
    let col = header
        .iter()
        .position(|cell| matches!(cell, Data::String(s) if s.trim() == column))
        .ok_or_else(|| WorkbookError::MissingColumn {
            sheet: sheet.clone(),
            column: column.to_string(),
        })?;

    let mut dates = Vec::new();
    for (i, row) in rows.enumerate() {
        match row.get(col) {
            None | Some(Data::Empty) => continue,
            Some(cell) => dates.push(cell_to_date(cell, i + 1, col)?),
        }
    }
    Ok(dates)
}

fn frame_from_range(sheet: &str, range: &Range<Data>) -> Result<Frame, WorkbookError> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| WorkbookError::EmptySheet(sheet.to_string()))?;

    let columns = header
        .iter()
        .enumerate()
        .skip(1)
        .map(|(col, cell)| match cell {
            Data::String(s) => Ok(s.clone()),
            other => Err(WorkbookError::InvalidCell {
                row: 0,
                col,
                message: format!("expected a column name, found {other:?}"),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut index = Vec::new();
    let mut values = Vec::new();
    for (i, row) in rows.enumerate() {
        let r = i + 1;
        let Some(first) = row.first() else { continue };
        if matches!(first, Data::Empty) {
            continue;
        }
        index.push(cell_to_date(first, r, 0)?);

        let mut parsed = Vec::with_capacity(columns.len());
        for col in 1..=columns.len() {
            let value = match row.get(col) {
                None | Some(Data::Empty) => None,
                Some(Data::Float(v)) => Some(*v),
                Some(Data::Int(v)) => Some(*v as f64),
                Some(other) => {
                    return Err(WorkbookError::InvalidCell {
                        row: r,
                        col,
                        message: format!("expected a number, found {other:?}"),
                    });
                }
            };
            parsed.push(value);
        }
        values.push(parsed);
    }

    Ok(Frame::new(index, columns, values)?)
}

/// Converts a date cell. Excel stores dates as serial day numbers counted from
/// 1899-12-30, which is what a date arrives as when the cell has no date format.
fn cell_to_date(cell: &Data, row: usize, col: usize) -> Result<NaiveDate, WorkbookError> {
    let invalid = |message: String| WorkbookError::InvalidCell { row, col, message };

    match cell {
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|dt| dt.date())
            .ok_or_else(|| invalid(format!("unrepresentable date {dt:?}"))),
        Data::DateTimeIso(s) | Data::String(s) => {
            let text = s.trim();
            let day = text.get(..10).unwrap_or(text);
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map_err(|e| invalid(format!("'{text}' is not a date: {e}")))
        }
        Data::Float(serial) => excel_serial_to_date(*serial)
            .ok_or_else(|| invalid(format!("{serial} is not a date serial"))),
        Data::Int(serial) => excel_serial_to_date(*serial as f64)
            .ok_or_else(|| invalid(format!("{serial} is not a date serial"))),
        other => Err(invalid(format!("expected a date, found {other:?}"))),
    }
}

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{Cell, Sheet, WorkbookWriter};
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("verdant-workbook-{}", std::process::id()))
            .join(name)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weight_table_survives_a_round_trip() {
        let weights = Frame::new(
            vec![date(2020, 3, 2), date(2020, 3, 3), date(2020, 3, 4)],
            vec!["NEE".into(), "XOM".into()],
            vec![
                vec![Some(0.5), Some(-0.5)],
                vec![Some(1.0), None],
                vec![Some(0.0), Some(0.0)],
            ],
        )
        .unwrap();
        let path = temp_path("round_trip.xlsx");

        let mut writer = WorkbookWriter::new();
        writer.add_sheet(Sheet::from_frame("Weights", "Date", &weights));
        writer.save(&path).unwrap();

        let restored = read_frame(&path, "Weights").unwrap();
        assert_eq!(restored, weights);
    }

    #[test]
    fn date_column_is_found_by_header() {
        let path = temp_path("events.xlsx");
        let mut sheet = Sheet::new("Events", vec!["Name".into(), "Begin Date".into()]);
        sheet.push_row(vec![Cell::from("Storm"), Cell::from(date(2020, 3, 1))]);
        sheet.push_row(vec![Cell::from("Flood"), Cell::Empty]);
        sheet.push_row(vec![Cell::from("Fire"), Cell::from("2021-08-15")]);

        let mut writer = WorkbookWriter::new();
        writer.add_sheet(sheet);
        writer.save(&path).unwrap();

        let dates = read_date_column(&path, "Begin Date").unwrap();
        assert_eq!(dates, vec![date(2020, 3, 1), date(2021, 8, 15)]);

        let missing = read_date_column(&path, "End Date");
        assert!(matches!(missing, Err(WorkbookError::MissingColumn { .. })));
    }

    #[test]
    fn excel_serials_convert_to_dates() {
        assert_eq!(excel_serial_to_date(43891.0), Some(date(2020, 3, 1)));
        assert_eq!(excel_serial_to_date(0.0), None);
    }
}
