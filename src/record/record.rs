use serde::{Deserialize, Serialize};

use crate::types::identifiers::RecordId;

/// One validated television model/size variant.
///
/// Built only by the catalog loader after field mapping and schema
/// validation; every optional field is `None` when the source did not
/// document it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecRecord {
    pub id: RecordId,
    pub brand: String,
    pub model: String,
    pub size_inch: u32,
    pub release_year: u16,
    pub price: Option<f64>,
    pub panel_technology: Option<String>,
    pub peak_brightness_nits: Option<f64>,
    pub refresh_rate_hz: Option<u32>,
    pub hdr_formats: Option<Vec<String>>,
    pub input_lag_ms: Option<f64>,
    pub local_dimming_zones: Option<u32>,
    pub native_contrast: Option<f64>,
    pub color_gamut_dci_p3_pct: Option<f64>,
    pub reflectance_pct: Option<f64>,
    pub uniformity_dev_pct: Option<f64>,
    pub memc_max_fps: Option<u32>,
    pub hdmi_2_1_ports: Option<u32>,
    pub vrr: Option<bool>,
    pub allm: Option<bool>,
}

impl SpecRecord {
    pub fn input_lag_class(&self) -> Option<InputLagClass> {
        self.input_lag_ms.map(InputLagClass::from_millis)
    }
}

/// Coarse input-lag bucket derived from the measured milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputLagClass {
    /// <= 10 ms
    Competitive,
    /// <= 20 ms
    Responsive,
    Casual,
}

impl InputLagClass {
    pub fn from_millis(ms: f64) -> Self {
        if ms <= 10.0 {
            InputLagClass::Competitive
        } else if ms <= 20.0 {
            InputLagClass::Responsive
        } else {
            InputLagClass::Casual
        }
    }
}

/// Canonical record fields, the vocabulary of the schema and field mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    #[serde(rename = "brand")]
    Brand,
    #[serde(rename = "model")]
    Model,
    #[serde(rename = "size_inch")]
    SizeInch,
    #[serde(rename = "release_year")]
    ReleaseYear,
    #[serde(rename = "price")]
    Price,
    #[serde(rename = "panel_technology")]
    PanelTechnology,
    #[serde(rename = "peak_brightness_nits")]
    PeakBrightnessNits,
    #[serde(rename = "refresh_rate_hz")]
    RefreshRateHz,
    #[serde(rename = "hdr_formats")]
    HdrFormats,
    #[serde(rename = "input_lag_ms")]
    InputLagMs,
    #[serde(rename = "local_dimming_zones")]
    LocalDimmingZones,
    #[serde(rename = "native_contrast")]
    NativeContrast,
    #[serde(rename = "color_gamut_dci_p3_pct")]
    ColorGamutDciP3Pct,
    #[serde(rename = "reflectance_pct")]
    ReflectancePct,
    #[serde(rename = "uniformity_dev_pct")]
    UniformityDevPct,
    #[serde(rename = "memc_max_fps")]
    MemcMaxFps,
    #[serde(rename = "hdmi_2_1_ports")]
    Hdmi21Ports,
    #[serde(rename = "vrr")]
    Vrr,
    #[serde(rename = "allm")]
    Allm,
}

/// Value shape a canonical field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
    Year,
    Flag,
    Enumerated,
    EnumeratedSet,
}

impl FieldKind {
    pub fn expected(self) -> &'static str {
        match self {
            FieldKind::Text => "non-empty string",
            FieldKind::Integer => "non-negative integer",
            FieldKind::Number => "number",
            FieldKind::Year => "year (integer or YYYY[-MM[-DD]] string)",
            FieldKind::Flag => "boolean",
            FieldKind::Enumerated => "string",
            FieldKind::EnumeratedSet => "list of strings",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Number | FieldKind::Year)
    }
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 19] = [
        CanonicalField::Brand,
        CanonicalField::Model,
        CanonicalField::SizeInch,
        CanonicalField::ReleaseYear,
        CanonicalField::Price,
        CanonicalField::PanelTechnology,
        CanonicalField::PeakBrightnessNits,
        CanonicalField::RefreshRateHz,
        CanonicalField::HdrFormats,
        CanonicalField::InputLagMs,
        CanonicalField::LocalDimmingZones,
        CanonicalField::NativeContrast,
        CanonicalField::ColorGamutDciP3Pct,
        CanonicalField::ReflectancePct,
        CanonicalField::UniformityDevPct,
        CanonicalField::MemcMaxFps,
        CanonicalField::Hdmi21Ports,
        CanonicalField::Vrr,
        CanonicalField::Allm,
    ];

    /// Fields the identifier is built from; required regardless of schema.
    pub const IDENTITY: [CanonicalField; 4] = [
        CanonicalField::Brand,
        CanonicalField::Model,
        CanonicalField::SizeInch,
        CanonicalField::ReleaseYear,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::Brand => "brand",
            CanonicalField::Model => "model",
            CanonicalField::SizeInch => "size_inch",
            CanonicalField::ReleaseYear => "release_year",
            CanonicalField::Price => "price",
            CanonicalField::PanelTechnology => "panel_technology",
            CanonicalField::PeakBrightnessNits => "peak_brightness_nits",
            CanonicalField::RefreshRateHz => "refresh_rate_hz",
            CanonicalField::HdrFormats => "hdr_formats",
            CanonicalField::InputLagMs => "input_lag_ms",
            CanonicalField::LocalDimmingZones => "local_dimming_zones",
            CanonicalField::NativeContrast => "native_contrast",
            CanonicalField::ColorGamutDciP3Pct => "color_gamut_dci_p3_pct",
            CanonicalField::ReflectancePct => "reflectance_pct",
            CanonicalField::UniformityDevPct => "uniformity_dev_pct",
            CanonicalField::MemcMaxFps => "memc_max_fps",
            CanonicalField::Hdmi21Ports => "hdmi_2_1_ports",
            CanonicalField::Vrr => "vrr",
            CanonicalField::Allm => "allm",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            CanonicalField::Brand | CanonicalField::Model => FieldKind::Text,
            CanonicalField::ReleaseYear => FieldKind::Year,
            CanonicalField::SizeInch
            | CanonicalField::RefreshRateHz
            | CanonicalField::LocalDimmingZones
            | CanonicalField::MemcMaxFps
            | CanonicalField::Hdmi21Ports => FieldKind::Integer,
            CanonicalField::Price
            | CanonicalField::PeakBrightnessNits
            | CanonicalField::InputLagMs
            | CanonicalField::NativeContrast
            | CanonicalField::ColorGamutDciP3Pct
            | CanonicalField::ReflectancePct
            | CanonicalField::UniformityDevPct => FieldKind::Number,
            CanonicalField::Vrr | CanonicalField::Allm => FieldKind::Flag,
            CanonicalField::PanelTechnology => FieldKind::Enumerated,
            CanonicalField::HdrFormats => FieldKind::EnumeratedSet,
        }
    }
}
