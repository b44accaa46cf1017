use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Price series must be strictly positive, found {value} on {date}")]
    NonPositiveValue { date: chrono::NaiveDate, value: f64 },
}
