use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Stable identifier of one model/size variant: `brand_model_size_year`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordIdError {
    #[error("Identifier component '{0}' is empty after normalization")]
    EmptyComponent(&'static str),
}

impl RecordId {
    /// Build the identifier from its four components.
    ///
    /// Each component is lowercased and every run of characters outside
    /// `[a-z0-9]` collapses to one `_`.
    pub fn from_parts(
        brand: &str,
        model: &str,
        size_inch: u32,
        release_year: u16,
    ) -> Result<Self, RecordIdError> {
        let brand = normalize_component(brand);
        if brand.is_empty() {
            return Err(RecordIdError::EmptyComponent("brand"));
        }
        let model = normalize_component(model);
        if model.is_empty() {
            return Err(RecordIdError::EmptyComponent("model"));
        }

        Ok(RecordId(format!("{brand}_{model}_{size_inch}_{release_year}")))
    }

    /// Wrap a caller-supplied identifier (e.g. from a compare request).
    /// Lookups are exact, so the caller's text is only trimmed and lowercased.
    pub fn parse(raw: &str) -> Self {
        RecordId(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for ch in raw.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }

    out
}

/// Content hash of a loaded catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogVersion(String);

impl CatalogVersion {
    /// Hash `id:record-json` lines, one per record, in the order given.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Self {
        let mut hasher = Sha256::new();
        for (id, body) in lines {
            hasher.update(id.as_bytes());
            hasher.update(b":");
            hasher.update(body);
            hasher.update(b"\n");
        }

        let hash = hasher.finalize();
        let hex = hex::encode(hash);

        CatalogVersion(format!("sha256:{hex}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
