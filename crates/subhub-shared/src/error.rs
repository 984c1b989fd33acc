use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("File ID is empty")]
    Empty,

    #[error("File ID too long: {len} chars (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("File ID contains invalid character {0:?}")]
    InvalidChar(char),

    #[error("Invalid subscription ID: {0}")]
    InvalidUuid(String),
}
