use subhub_shared::IdError;
use subhub_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload failed: HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The server answered `Code: 0`.
    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Upload succeeded but the server returned no URL")]
    MissingUrl,

    #[error("Please enter subscription content")]
    EmptyContent,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Id(#[from] IdError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
