use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::CanonicalField;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed document {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid schema: {0}")]
    Invalid(String),
}

/// Inclusive numeric bounds for one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Permitted values for enumerated fields. An empty list permits anything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Enumerations {
    #[serde(default)]
    pub panel_technology: Vec<String>,
    #[serde(default)]
    pub hdr_formats: Vec<String>,
    #[serde(default)]
    pub scene: Vec<String>,
}

impl Enumerations {
    pub fn permits(values: &[String], candidate: &str) -> bool {
        values.is_empty() || values.iter().any(|v| v == candidate)
    }
}

/// The declared contract every catalog record is validated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreSchema {
    pub version: String,
    #[serde(default)]
    pub required: Vec<CanonicalField>,
    #[serde(default)]
    pub enumerations: Enumerations,
    #[serde(default)]
    pub ranges: BTreeMap<CanonicalField, ValueRange>,
}

impl CoreSchema {
    pub fn v0() -> Self {
        let range = |min: f64, max: f64| ValueRange { min, max };
        let ranges = BTreeMap::from([
            (CanonicalField::SizeInch, range(10.0, 120.0)),
            (CanonicalField::ReleaseYear, range(2010.0, 2035.0)),
            (CanonicalField::Price, range(0.0, 1_000_000.0)),
            (CanonicalField::PeakBrightnessNits, range(0.0, 10_000.0)),
            (CanonicalField::RefreshRateHz, range(24.0, 500.0)),
            (CanonicalField::InputLagMs, range(0.0, 200.0)),
            (CanonicalField::LocalDimmingZones, range(0.0, 100_000.0)),
            (CanonicalField::NativeContrast, range(100.0, 10_000_000.0)),
            (CanonicalField::ColorGamutDciP3Pct, range(0.0, 100.0)),
            (CanonicalField::ReflectancePct, range(0.0, 100.0)),
            (CanonicalField::UniformityDevPct, range(0.0, 100.0)),
            (CanonicalField::MemcMaxFps, range(0.0, 500.0)),
            (CanonicalField::Hdmi21Ports, range(0.0, 8.0)),
        ]);

        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();

        Self {
            version: "1".into(),
            required: CanonicalField::IDENTITY.to_vec(),
            enumerations: Enumerations {
                panel_technology: strings(&["lcd", "qled", "mini_led", "qd_mini_led", "oled", "qd_oled"]),
                hdr_formats: strings(&["dolby_vision", "hdr10_plus", "hdr10", "hlg"]),
                scene: strings(&["ps5", "movie", "bright", "sport"]),
            },
            ranges,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schema: CoreSchema = serde_yaml::from_str(&text).map_err(|source| SchemaError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        schema.validated()
    }

    /// Check internal consistency and normalize enumeration spelling.
    pub fn validated(mut self) -> Result<Self, SchemaError> {
        for (field, range) in &self.ranges {
            if !field.kind().is_numeric() {
                return Err(SchemaError::Invalid(format!(
                    "range declared for non-numeric field '{}'",
                    field.name()
                )));
            }
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(SchemaError::Invalid(format!(
                    "range for '{}' must satisfy min <= max",
                    field.name()
                )));
            }
        }

        for list in [
            &mut self.enumerations.panel_technology,
            &mut self.enumerations.hdr_formats,
            &mut self.enumerations.scene,
        ] {
            for value in list.iter_mut() {
                *value = value.trim().to_lowercase();
                if value.is_empty() {
                    return Err(SchemaError::Invalid("empty enumeration value".into()));
                }
            }
        }

        Ok(self)
    }

    /// Declared required fields plus the identifier components.
    pub fn required_fields(&self) -> Vec<CanonicalField> {
        let mut fields: Vec<CanonicalField> = CanonicalField::IDENTITY
            .iter()
            .chain(self.required.iter())
            .copied()
            .collect();
        fields.sort();
        fields.dedup();
        fields
    }
}
