use serde::Serialize;
use std::fmt;

use crate::common::errors::StoreError;

/// A user-visible, non-fatal message. Notices queue up on the controller
/// and are shown once on the next render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    NotFound { id: u64 },
    ReadFailed { filename: String, reason: String },
    WriteFailed { reason: String },
    ReadError { reason: String },
    StorageUnavailable { reason: String },
}

impl Notice {
    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::NotFound { .. })
    }
}

impl From<StoreError> for Notice {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::StorageUnavailable(reason) => Notice::StorageUnavailable { reason },
            StoreError::Write(reason) => Notice::WriteFailed { reason },
            StoreError::Read(reason) => Notice::ReadError { reason },
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NotFound { .. } => write!(f, "Video not found"),
            Notice::ReadFailed { filename, reason } => {
                write!(f, "Could not read '{}': {}", filename, reason)
            }
            Notice::WriteFailed { reason } => write!(f, "Could not save changes: {}", reason),
            Notice::ReadError { reason } => write!(f, "Could not load videos: {}", reason),
            Notice::StorageUnavailable { reason } => {
                write!(f, "Local storage is unavailable: {}", reason)
            }
        }
    }
}
