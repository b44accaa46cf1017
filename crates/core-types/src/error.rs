use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("Row index must be strictly increasing, found {0} after {1}")]
    UnsortedIndex(String, String),
}
