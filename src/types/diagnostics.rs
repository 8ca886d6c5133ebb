use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::types::identifiers::RecordId;

/// A record that was excluded from the catalog, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub code: ErrorCode,
    pub origin: String,
    pub record_id: Option<RecordId>,
    pub reason: ValidationReason,
}

impl ValidationWarning {
    pub fn new(origin: impl Into<String>, record_id: Option<RecordId>, reason: ValidationReason) -> Self {
        Self {
            code: ErrorCode::RecordValidationWarning,
            origin: origin.into(),
            record_id,
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationReason {
    MissingRequired { field: String },
    WrongType { field: String, expected: String },
    OutOfRange { field: String, value: f64, min: f64, max: f64 },
    NotInEnumeration { field: String, value: String },
    InvalidDate { field: String, value: String },
    InvalidIdentifier { message: String },
    DuplicateId { id: RecordId },
    Unparseable { message: String },
    Unreadable { message: String },
}

impl std::fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationReason::MissingRequired { field } => write!(f, "missing required field '{field}'"),
            ValidationReason::WrongType { field, expected } => {
                write!(f, "field '{field}' must be a {expected}")
            }
            ValidationReason::OutOfRange { field, value, min, max } => {
                write!(f, "field '{field}' value {value} outside [{min}, {max}]")
            }
            ValidationReason::NotInEnumeration { field, value } => {
                write!(f, "field '{field}' value '{value}' is not a permitted value")
            }
            ValidationReason::InvalidDate { field, value } => {
                write!(f, "field '{field}' value '{value}' is not a valid date")
            }
            ValidationReason::InvalidIdentifier { message } => write!(f, "invalid identifier: {message}"),
            ValidationReason::DuplicateId { id } => write!(f, "duplicate identifier '{id}'"),
            ValidationReason::Unparseable { message } => write!(f, "unparseable document: {message}"),
            ValidationReason::Unreadable { message } => write!(f, "unreadable source: {message}"),
        }
    }
}
