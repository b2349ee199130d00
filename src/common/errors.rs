use log::error;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures of the local store. A missing id is not an error: lookups
/// return `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database cannot be opened at all; nothing else works.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A single write transaction aborted; nothing was written.
    #[error("write failed: {0}")]
    Write(String),

    /// A single read transaction aborted.
    #[error("read failed: {0}")]
    Read(String),
}

impl StoreError {
    pub fn unavailable(error: impl std::fmt::Display) -> Self {
        StoreError::StorageUnavailable(error.to_string())
    }

    pub fn write(error: impl std::fmt::Display) -> Self {
        StoreError::Write(error.to_string())
    }

    pub fn read(error: impl std::fmt::Display) -> Self {
        StoreError::Read(error.to_string())
    }

    /// The message without the variant prefix.
    pub fn into_reason(self) -> String {
        match self {
            StoreError::StorageUnavailable(reason)
            | StoreError::Write(reason)
            | StoreError::Read(reason) => reason,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::StorageUnavailable(_))
    }
}

/// Log an error with its whole context chain and hand it back.
pub fn handle_error(error: anyhow::Error) -> anyhow::Error {
    let chain = error
        .chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n  caused by: ");
    error!("{}", chain);
    error
}
