use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Market data request failed: {0}")]
    Api(#[from] api_client::error::ApiError),

    #[error("Could not assemble the price table: {0}")]
    Table(#[from] core_types::CoreError),

    #[error("Could not write the workbook: {0}")]
    Workbook(#[from] workbook::WorkbookError),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<indicatif::style::TemplateError> for FetchError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        FetchError::ProgressBarTemplate(error.to_string())
    }
}
