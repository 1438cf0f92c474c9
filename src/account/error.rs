use crate::codestore::CodeStoreError;
use crate::directory::DirectoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignupError {
    #[error("invalid signup request: {0}")]
    InvalidRequest(&'static str),
    #[error(transparent)]
    DirectoryUnavailable(#[from] DirectoryError),
    #[error(transparent)]
    CodeStoreUnavailable(#[from] CodeStoreError),
    #[error("code lifetime of {0:?} is out of range")]
    LifetimeOutOfRange(std::time::Duration),
    #[error("failed to encode verification payload")]
    Payload(#[from] serde_json::Error),
}
