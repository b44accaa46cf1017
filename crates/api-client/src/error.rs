use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("The provider returned an error for {symbol}: {message}")]
    Provider { symbol: String, message: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("No data returned for {0}")]
    NoData(String),

    #[error("Could not obtain an API crumb: {0}")]
    Crumb(String),
}
