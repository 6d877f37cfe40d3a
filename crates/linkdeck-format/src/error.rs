use thiserror::Error;

/// Errors produced while parsing or formatting timestamps.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp { input: String, reason: String },

    #[error("invalid UTC offset: {0:?}")]
    InvalidOffset(String),
}

pub type Result<T> = std::result::Result<T, FormatError>;
