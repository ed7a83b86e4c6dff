use std::io;

use thiserror::Error;

use crate::application::error::ApplicationError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error("Upload interrupted: {0}")]
    Interrupted(String),

    #[error("I/O error on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Maps a filesystem error on `name`, keeping `NotFound` distinguishable.
    pub fn io(name: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(name.to_string())
        } else {
            StorageError::Io {
                name: name.to_string(),
                source,
            }
        }
    }

    /// Failure while writing; never reported as `NotFound`.
    pub fn write(name: &str, source: io::Error) -> Self {
        StorageError::Io {
            name: name.to_string(),
            source,
        }
    }
}

impl From<StorageError> for ApplicationError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(_) => ApplicationError::NotFound,
            StorageError::InvalidName(name) => ApplicationError::InvalidName(name),
            StorageError::Interrupted(msg) => ApplicationError::UploadInterrupted(msg),
            error @ StorageError::Io { .. } => ApplicationError::IoError(error.to_string()),
        }
    }
}
