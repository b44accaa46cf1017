use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Ticker '{0}' is on both the long and the short side")]
    OverlappingTickers(String),

    #[error("Weight table refers to ticker '{0}' which has no price column")]
    UnknownTicker(String),

    #[error("Table error: {0}")]
    Table(#[from] core_types::CoreError),

    #[error("Could not read the event calendar: {0}")]
    Events(#[from] workbook::WorkbookError),
}
