use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to read workbook: {0}")]
    Read(#[from] calamine::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sheet '{0}' has no header row")]
    EmptySheet(String),

    #[error("Column '{column}' not found in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },

    #[error("Unexpected cell at row {row}, column {col}: {message}")]
    InvalidCell { row: usize, col: usize, message: String },

    #[error("Table error: {0}")]
    Table(#[from] core_types::CoreError),
}
