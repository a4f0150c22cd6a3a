use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Unrecognized date: {0:?}")]
    InvalidDate(String),
    #[error("Unrecognized month: {0:?}")]
    InvalidMonth(String),
    #[error("Failed to parse decimal value: {0:?}")]
    InvalidDecimal(String),
    #[error("Failed to parse percent value: {0:?}")]
    InvalidPercent(String),
}
