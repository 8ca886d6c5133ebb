use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::comparison::CompareError;
use crate::config::ConfigError;
use crate::scene::ProfileError;
use crate::schema::SchemaError;

/// Machine-readable outcome codes shared by every output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    SchemaError,
    RecordValidationWarning,
    InvalidInput,
    NoMatch,
    UnknownId,
    Degraded,
}

/// Fatal failures. Per-record and per-request problems are data, not errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Compare(#[from] CompareError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Compare(_) | EngineError::Config(_) => ErrorCode::InvalidInput,
            EngineError::Schema(_) | EngineError::Profile(_) => ErrorCode::SchemaError,
        }
    }
}
