use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("type mismatch for `{field}`: {message}")]
    TypeMismatch { field: String, message: String },
}

impl DomainError {
    pub fn type_mismatch(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeMismatch { field: field.into(), message: message.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("storage failure at `{}`: {message}", path.display())]
    Storage { path: PathBuf, message: String },
    #[error("serialization failure: {0}")]
    Serialization(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    TypeMismatch,
    StorageFailure,
    Internal,
}

impl ApplicationError {
    pub fn storage(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Storage { path: path.into(), message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(DomainError::InvalidInput(_)) => ErrorKind::InvalidInput,
            Self::Domain(DomainError::TypeMismatch { .. }) => ErrorKind::TypeMismatch,
            Self::Storage { .. } => ErrorKind::StorageFailure,
            Self::Serialization(_) | Self::Configuration(_) => ErrorKind::Internal,
        }
    }

    /// Renders the inline `{"error": ...}` object returned to callers.
    pub fn to_error_payload(&self) -> String {
        crate::serializer::error_payload(self)
    }
}
