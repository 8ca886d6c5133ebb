use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::core_schema::SchemaError;
use crate::record::CanonicalField;

/// Where each canonical field is read from in a raw record.
///
/// Every field maps to an ordered list of dotted paths; the first non-null
/// path wins. Fields not listed fall back to their own name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMapping {
    #[serde(default)]
    fields: BTreeMap<CanonicalField, Vec<String>>,
}

impl FieldMapping {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mapping: FieldMapping = serde_yaml::from_str(&text).map_err(|source| SchemaError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        mapping.validated()
    }

    pub fn validated(self) -> Result<Self, SchemaError> {
        for (field, paths) in &self.fields {
            if paths.is_empty() {
                return Err(SchemaError::Invalid(format!(
                    "mapping for '{}' lists no paths",
                    field.name()
                )));
            }
            if let Some(bad) = paths
                .iter()
                .find(|p| p.split('.').any(|segment| segment.trim().is_empty()))
            {
                return Err(SchemaError::Invalid(format!(
                    "mapping for '{}' has malformed path '{bad}'",
                    field.name()
                )));
            }
        }
        Ok(self)
    }

    pub fn with_paths(mut self, field: CanonicalField, paths: &[&str]) -> Self {
        self.fields
            .insert(field, paths.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn paths_for(&self, field: CanonicalField) -> Vec<String> {
        match self.fields.get(&field) {
            Some(paths) => paths.clone(),
            None => vec![field.name().to_string()],
        }
    }
}
