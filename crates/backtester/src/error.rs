use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Strategy execution error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Could not write backtest results: {0}")]
    Workbook(#[from] workbook::WorkbookError),

    #[error("Table error: {0}")]
    Table(#[from] core_types::CoreError),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),

    #[error("Price table is empty; there is nothing to simulate.")]
    DataUnavailable,

    #[error("Ticker '{0}' has weights but no prices")]
    UnknownTicker(String),

    #[error("Invalid simulation parameters: {0}")]
    InvalidParameters(String),
}

impl From<indicatif::style::TemplateError> for BacktestError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        BacktestError::ProgressBarTemplate(error.to_string())
    }
}
