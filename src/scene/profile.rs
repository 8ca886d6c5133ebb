use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{Attribute, AttributeValue};
use crate::schema::{CoreSchema, Enumerations};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed profiles document {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid profile '{scene}': {message}")]
    Invalid { scene: String, message: String },
    #[error("Scene '{0}' is not declared in the schema's scene enumeration")]
    UndeclaredScene(String),
    #[error("No scene profiles defined")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeWeight {
    pub attribute: Attribute,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    IsNull,
    NotNull,
}

impl PenaltyOp {
    fn needs_value(self) -> bool {
        !matches!(self, PenaltyOp::IsNull | PenaltyOp::NotNull)
    }
}

/// Multiplies a candidate's total when its raw attribute matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PenaltyRule {
    pub attribute: Attribute,
    pub op: PenaltyOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub multiplier: f64,
}

impl PenaltyRule {
    /// Comparison ops never match a missing or categorical value.
    pub fn applies(&self, raw: Option<&AttributeValue>) -> bool {
        match self.op {
            PenaltyOp::IsNull => return raw.is_none(),
            PenaltyOp::NotNull => return raw.is_some(),
            _ => {}
        }

        let (Some(x), Some(threshold)) = (raw.and_then(AttributeValue::as_ordinal), self.value) else {
            return false;
        };

        match self.op {
            PenaltyOp::Gt => x > threshold,
            PenaltyOp::Ge => x >= threshold,
            PenaltyOp::Lt => x < threshold,
            PenaltyOp::Le => x <= threshold,
            PenaltyOp::Eq => x == threshold,
            PenaltyOp::IsNull | PenaltyOp::NotNull => false,
        }
    }
}

/// A named usage scene and the attribute weights that define it.
///
/// Weights conventionally sum to 100; the scorer does not rescale them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneProfile {
    pub name: String,
    pub description: String,
    pub weights: Vec<AttributeWeight>,
    pub penalties: Vec<PenaltyRule>,
}

impl SceneProfile {
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().map(|w| w.weight).sum()
    }

    /// Position of `attribute` in the declared weights, used as a tie-break.
    pub fn declaration_index(&self, attribute: Attribute) -> Option<usize> {
        self.weights.iter().position(|w| w.attribute == attribute)
    }

    fn validate(&self) -> Result<(), ProfileError> {
        let invalid = |message: String| ProfileError::Invalid {
            scene: self.name.clone(),
            message,
        };

        if self.name.is_empty() {
            return Err(invalid("scene name is empty".into()));
        }
        if self.weights.is_empty() {
            return Err(invalid("no attribute weights".into()));
        }

        let mut seen = BTreeSet::new();
        for w in &self.weights {
            if !w.weight.is_finite() || w.weight < 0.0 {
                return Err(invalid(format!(
                    "weight for '{}' must be a finite non-negative number",
                    w.attribute.name()
                )));
            }
            if !seen.insert(w.attribute) {
                return Err(invalid(format!("attribute '{}' weighted twice", w.attribute.name())));
            }
        }

        for rule in &self.penalties {
            if !(rule.multiplier > 0.0 && rule.multiplier <= 1.0) {
                return Err(invalid(format!(
                    "penalty multiplier for '{}' must be in (0, 1]",
                    rule.attribute.name()
                )));
            }
            if rule.op.needs_value() && !rule.value.map(f64::is_finite).unwrap_or(false) {
                return Err(invalid(format!(
                    "penalty on '{}' needs a finite comparison value",
                    rule.attribute.name()
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfilesDocument {
    profiles: BTreeMap<String, ProfileBody>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileBody {
    #[serde(default)]
    description: String,
    weights: Vec<AttributeWeight>,
    #[serde(default)]
    penalties: Vec<PenaltyRule>,
}

/// All scene profiles for a run. Loaded once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneProfiles {
    profiles: BTreeMap<String, SceneProfile>,
}

impl SceneProfiles {
    pub fn new(profiles: Vec<SceneProfile>) -> Result<Self, ProfileError> {
        if profiles.is_empty() {
            return Err(ProfileError::Empty);
        }

        let mut map = BTreeMap::new();
        for mut profile in profiles {
            profile.name = profile.name.trim().to_lowercase();
            profile.validate()?;
            if map.contains_key(&profile.name) {
                return Err(ProfileError::Invalid {
                    scene: profile.name,
                    message: "defined twice".into(),
                });
            }
            map.insert(profile.name.clone(), profile);
        }

        Ok(Self { profiles: map })
    }

    pub fn from_path(path: &Path) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: ProfilesDocument = serde_yaml::from_str(&text).map_err(|source| ProfileError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        let profiles = doc
            .profiles
            .into_iter()
            .map(|(name, body)| SceneProfile {
                name,
                description: body.description,
                weights: body.weights,
                penalties: body.penalties,
            })
            .collect();

        Self::new(profiles)
    }

    /// Built-in scenes: console gaming, film, bright living room, sports.
    pub fn builtin() -> Self {
        let w = |attribute: Attribute, weight: f64| AttributeWeight { attribute, weight };
        let penalty = |attribute: Attribute, op: PenaltyOp, value: f64, multiplier: f64| PenaltyRule {
            attribute,
            op,
            value: Some(value),
            multiplier,
        };

        let profiles = vec![
            SceneProfile {
                name: "ps5".into(),
                description: "Console gaming: input lag first, then HDMI 2.1/VRR/ALLM, then HDR punch.".into(),
                weights: vec![
                    w(Attribute::InputLag, 30.0),
                    w(Attribute::Hdmi21Ports, 15.0),
                    w(Attribute::Vrr, 10.0),
                    w(Attribute::Allm, 5.0),
                    w(Attribute::RefreshRate, 10.0),
                    w(Attribute::PeakBrightness, 10.0),
                    w(Attribute::LocalDimmingZones, 10.0),
                    w(Attribute::Price, 10.0),
                ],
                penalties: vec![penalty(Attribute::Hdmi21Ports, PenaltyOp::Lt, 2.0, 0.9)],
            },
            SceneProfile {
                name: "movie".into(),
                description: "Dark-room film: dimming and contrast first, then brightness and uniformity.".into(),
                weights: vec![
                    w(Attribute::LocalDimmingZones, 25.0),
                    w(Attribute::NativeContrast, 20.0),
                    w(Attribute::PeakBrightness, 15.0),
                    w(Attribute::HdrFormats, 10.0),
                    w(Attribute::Uniformity, 10.0),
                    w(Attribute::Reflectance, 5.0),
                    w(Attribute::PanelTechnology, 5.0),
                    w(Attribute::Price, 10.0),
                ],
                penalties: Vec::new(),
            },
            SceneProfile {
                name: "bright".into(),
                description: "Bright living room: brightness and anti-reflection first, then value.".into(),
                weights: vec![
                    w(Attribute::PeakBrightness, 35.0),
                    w(Attribute::Reflectance, 25.0),
                    w(Attribute::LocalDimmingZones, 10.0),
                    w(Attribute::ColorGamut, 10.0),
                    w(Attribute::Price, 20.0),
                ],
                penalties: vec![penalty(Attribute::Reflectance, PenaltyOp::Gt, 3.0, 0.9)],
            },
            SceneProfile {
                name: "sport".into(),
                description: "Live sports: motion handling and refresh rate first.".into(),
                weights: vec![
                    w(Attribute::MotionHandling, 30.0),
                    w(Attribute::RefreshRate, 25.0),
                    w(Attribute::PeakBrightness, 20.0),
                    w(Attribute::InputLag, 10.0),
                    w(Attribute::Price, 15.0),
                ],
                penalties: Vec::new(),
            },
        ];

        Self {
            profiles: profiles.into_iter().map(|p| (p.name.clone(), p)).collect(),
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, scene: &str) -> Option<&SceneProfile> {
        self.profiles.get(&scene.trim().to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Fail if a profile names a scene the schema does not permit.
    pub fn check_against(&self, schema: &CoreSchema) -> Result<(), ProfileError> {
        match self
            .names()
            .find(|name| !Enumerations::permits(&schema.enumerations.scene, name))
        {
            Some(name) => Err(ProfileError::UndeclaredScene(name.to_string())),
            None => Ok(()),
        }
    }
}
