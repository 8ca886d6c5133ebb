use serde::{Deserialize, Serialize};

use super::record::SpecRecord;

/// Scene-relevant attributes a profile can weight and the comparator lists.
///
/// Declaration order here is the comparator's row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Price,
    PeakBrightness,
    LocalDimmingZones,
    NativeContrast,
    ColorGamut,
    Reflectance,
    Uniformity,
    RefreshRate,
    MotionHandling,
    InputLag,
    #[serde(rename = "hdmi_2_1_ports")]
    Hdmi21Ports,
    Vrr,
    Allm,
    HdrFormats,
    PanelTechnology,
}

/// Which end of an attribute's scale is preferable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
    Categorical,
}

/// How a raw value maps onto the 0..=100 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Linear between reference bounds, clamped.
    Linear { min: f64, max: f64 },
    /// true → 100, false → 0.
    Flag,
    /// Per-variant score table.
    Lookup,
}

impl Attribute {
    pub const ALL: [Attribute; 15] = [
        Attribute::Price,
        Attribute::PeakBrightness,
        Attribute::LocalDimmingZones,
        Attribute::NativeContrast,
        Attribute::ColorGamut,
        Attribute::Reflectance,
        Attribute::Uniformity,
        Attribute::RefreshRate,
        Attribute::MotionHandling,
        Attribute::InputLag,
        Attribute::Hdmi21Ports,
        Attribute::Vrr,
        Attribute::Allm,
        Attribute::HdrFormats,
        Attribute::PanelTechnology,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Price => "price",
            Attribute::PeakBrightness => "peak_brightness",
            Attribute::LocalDimmingZones => "local_dimming_zones",
            Attribute::NativeContrast => "native_contrast",
            Attribute::ColorGamut => "color_gamut",
            Attribute::Reflectance => "reflectance",
            Attribute::Uniformity => "uniformity",
            Attribute::RefreshRate => "refresh_rate",
            Attribute::MotionHandling => "motion_handling",
            Attribute::InputLag => "input_lag",
            Attribute::Hdmi21Ports => "hdmi_2_1_ports",
            Attribute::Vrr => "vrr",
            Attribute::Allm => "allm",
            Attribute::HdrFormats => "hdr_formats",
            Attribute::PanelTechnology => "panel_technology",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Attribute::Price
            | Attribute::Reflectance
            | Attribute::Uniformity
            | Attribute::InputLag => Direction::LowerIsBetter,
            Attribute::HdrFormats | Attribute::PanelTechnology => Direction::Categorical,
            _ => Direction::HigherIsBetter,
        }
    }

    /// Reference bounds are fixed so a record's score never depends on
    /// which other records survived the filter.
    pub fn normalization(self) -> Normalization {
        match self {
            Attribute::Price => Normalization::Linear { min: 0.0, max: 50_000.0 },
            Attribute::PeakBrightness => Normalization::Linear { min: 0.0, max: 5_000.0 },
            Attribute::LocalDimmingZones => Normalization::Linear { min: 0.0, max: 5_000.0 },
            Attribute::NativeContrast => Normalization::Linear { min: 1_000.0, max: 20_000.0 },
            Attribute::ColorGamut => Normalization::Linear { min: 70.0, max: 100.0 },
            Attribute::Reflectance => Normalization::Linear { min: 0.0, max: 10.0 },
            Attribute::Uniformity => Normalization::Linear { min: 0.0, max: 20.0 },
            Attribute::RefreshRate => Normalization::Linear { min: 50.0, max: 240.0 },
            Attribute::MotionHandling => Normalization::Linear { min: 0.0, max: 240.0 },
            Attribute::InputLag => Normalization::Linear { min: 0.0, max: 40.0 },
            Attribute::Hdmi21Ports => Normalization::Linear { min: 0.0, max: 4.0 },
            Attribute::Vrr | Attribute::Allm => Normalization::Flag,
            Attribute::HdrFormats | Attribute::PanelTechnology => Normalization::Lookup,
        }
    }

    /// Raw value of this attribute on `record`, `None` when undocumented.
    pub fn value_of(self, record: &SpecRecord) -> Option<AttributeValue> {
        let number = |v: Option<f64>| v.map(AttributeValue::Number);
        let count = |v: Option<u32>| v.map(|n| AttributeValue::Number(f64::from(n)));

        match self {
            Attribute::Price => number(record.price),
            Attribute::PeakBrightness => number(record.peak_brightness_nits),
            Attribute::LocalDimmingZones => count(record.local_dimming_zones),
            Attribute::NativeContrast => number(record.native_contrast),
            Attribute::ColorGamut => number(record.color_gamut_dci_p3_pct),
            Attribute::Reflectance => number(record.reflectance_pct),
            Attribute::Uniformity => number(record.uniformity_dev_pct),
            Attribute::RefreshRate => count(record.refresh_rate_hz),
            Attribute::MotionHandling => count(record.memc_max_fps),
            Attribute::InputLag => number(record.input_lag_ms),
            Attribute::Hdmi21Ports => count(record.hdmi_2_1_ports),
            Attribute::Vrr => record.vrr.map(AttributeValue::Flag),
            Attribute::Allm => record.allm.map(AttributeValue::Flag),
            Attribute::HdrFormats => record.hdr_formats.clone().map(AttributeValue::Set),
            Attribute::PanelTechnology => record.panel_technology.clone().map(AttributeValue::Text),
        }
    }
}

/// A raw attribute value exactly as loaded, never normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Number(f64),
    Text(String),
    Set(Vec<String>),
}

impl AttributeValue {
    /// Ordinal view used for comparisons and penalty rules.
    /// Flags order false < true; categorical values have none.
    pub fn as_ordinal(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            AttributeValue::Text(_) | AttributeValue::Set(_) => None,
        }
    }
}

/// HDR format points, summed and capped at 100.
pub fn hdr_format_points(format: &str) -> f64 {
    match format {
        "dolby_vision" => 40.0,
        "hdr10_plus" => 30.0,
        "hdr10" => 20.0,
        "hlg" => 10.0,
        _ => 0.0,
    }
}

pub fn panel_technology_points(technology: &str) -> f64 {
    match technology {
        "oled" | "qd_oled" => 100.0,
        "qd_mini_led" => 90.0,
        "mini_led" => 80.0,
        "qled" => 60.0,
        "lcd" => 40.0,
        _ => 30.0,
    }
}
