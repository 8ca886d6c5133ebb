use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use super::core_schema::{CoreSchema, Enumerations};
use super::mapping::FieldMapping;
use crate::record::{CanonicalField, FieldKind, RawRecord, RecordId, SpecRecord};
use crate::types::diagnostics::ValidationReason;

/// Turn one raw document into a typed record, or the first reason it fails.
///
/// Nothing is defaulted: a field is either read exactly as declared or it is
/// absent. Absent required fields and any malformed present field reject the
/// whole record.
pub fn build_record(
    raw: &RawRecord,
    schema: &CoreSchema,
    mapping: &FieldMapping,
) -> Result<SpecRecord, ValidationReason> {
    if !raw.is_document() {
        return Err(ValidationReason::Unparseable {
            message: "record document must be a mapping".into(),
        });
    }

    let fields = FieldReader { raw, schema, mapping };

    for field in schema.required_fields() {
        if fields.value(field).is_none() {
            return Err(ValidationReason::MissingRequired {
                field: field.name().to_string(),
            });
        }
    }

    // Required above, so presence is already established.
    let brand = fields.text(CanonicalField::Brand)?.unwrap_or_default();
    let model = fields.text(CanonicalField::Model)?.unwrap_or_default();
    let size_inch = fields.integer(CanonicalField::SizeInch)?.unwrap_or_default();
    let release_year = fields.year(CanonicalField::ReleaseYear)?.unwrap_or_default();

    let id = RecordId::from_parts(&brand, &model, size_inch, release_year).map_err(|err| {
        ValidationReason::InvalidIdentifier {
            message: err.to_string(),
        }
    })?;

    let price = fields.number(CanonicalField::Price)?;
    if let Some(p) = price {
        if p < 0.0 {
            return Err(ValidationReason::OutOfRange {
                field: CanonicalField::Price.name().to_string(),
                value: p,
                min: 0.0,
                max: f64::MAX,
            });
        }
    }

    Ok(SpecRecord {
        id,
        brand,
        model,
        size_inch,
        release_year,
        price,
        panel_technology: fields.enumerated(
            CanonicalField::PanelTechnology,
            &schema.enumerations.panel_technology,
        )?,
        peak_brightness_nits: fields.number(CanonicalField::PeakBrightnessNits)?,
        refresh_rate_hz: fields.integer(CanonicalField::RefreshRateHz)?,
        hdr_formats: fields.enumerated_set(CanonicalField::HdrFormats, &schema.enumerations.hdr_formats)?,
        input_lag_ms: fields.number(CanonicalField::InputLagMs)?,
        local_dimming_zones: fields.integer(CanonicalField::LocalDimmingZones)?,
        native_contrast: fields.number(CanonicalField::NativeContrast)?,
        color_gamut_dci_p3_pct: fields.number(CanonicalField::ColorGamutDciP3Pct)?,
        reflectance_pct: fields.number(CanonicalField::ReflectancePct)?,
        uniformity_dev_pct: fields.number(CanonicalField::UniformityDevPct)?,
        memc_max_fps: fields.integer(CanonicalField::MemcMaxFps)?,
        hdmi_2_1_ports: fields.integer(CanonicalField::Hdmi21Ports)?,
        vrr: fields.flag(CanonicalField::Vrr)?,
        allm: fields.flag(CanonicalField::Allm)?,
    })
}

struct FieldReader<'a> {
    raw: &'a RawRecord,
    schema: &'a CoreSchema,
    mapping: &'a FieldMapping,
}

impl FieldReader<'_> {
    fn value(&self, field: CanonicalField) -> Option<&Value> {
        self.raw.first_of(&self.mapping.paths_for(field))
    }

    fn wrong_type(field: CanonicalField) -> ValidationReason {
        ValidationReason::WrongType {
            field: field.name().to_string(),
            expected: field.kind().expected().to_string(),
        }
    }

    fn check_range(&self, field: CanonicalField, value: f64) -> Result<(), ValidationReason> {
        match self.schema.ranges.get(&field) {
            Some(range) if !range.contains(value) => Err(ValidationReason::OutOfRange {
                field: field.name().to_string(),
                value,
                min: range.min,
                max: range.max,
            }),
            _ => Ok(()),
        }
    }

    fn text(&self, field: CanonicalField) -> Result<Option<String>, ValidationReason> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
            Some(_) => Err(Self::wrong_type(field)),
        }
    }

    fn number(&self, field: CanonicalField) -> Result<Option<f64>, ValidationReason> {
        let Some(value) = self.value(field) else {
            return Ok(None);
        };
        let n = value.as_f64().ok_or_else(|| Self::wrong_type(field))?;
        self.check_range(field, n)?;
        Ok(Some(n))
    }

    fn integer(&self, field: CanonicalField) -> Result<Option<u32>, ValidationReason> {
        let Some(n) = self.number(field)? else {
            return Ok(None);
        };
        if n.fract() != 0.0 || n < 0.0 || n > f64::from(u32::MAX) {
            return Err(Self::wrong_type(field));
        }
        Ok(Some(n as u32))
    }

    fn year(&self, field: CanonicalField) -> Result<Option<u16>, ValidationReason> {
        let year = match self.value(field) {
            None => return Ok(None),
            Some(Value::Number(n)) => {
                let n = n.as_f64().ok_or_else(|| Self::wrong_type(field))?;
                if n.fract() != 0.0 || !(0.0..=f64::from(u16::MAX)).contains(&n) {
                    return Err(Self::wrong_type(field));
                }
                n as u16
            }
            Some(Value::String(s)) => parse_year(s).ok_or_else(|| ValidationReason::InvalidDate {
                field: field.name().to_string(),
                value: s.clone(),
            })?,
            Some(_) => return Err(Self::wrong_type(field)),
        };
        self.check_range(field, f64::from(year))?;
        Ok(Some(year))
    }

    fn flag(&self, field: CanonicalField) -> Result<Option<bool>, ValidationReason> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(Self::wrong_type(field)),
        }
    }

    fn enumerated(
        &self,
        field: CanonicalField,
        permitted: &[String],
    ) -> Result<Option<String>, ValidationReason> {
        debug_assert_eq!(field.kind(), FieldKind::Enumerated);
        match self.value(field) {
            None => Ok(None),
            Some(Value::String(s)) => Self::permitted(field, s, permitted).map(Some),
            Some(_) => Err(Self::wrong_type(field)),
        }
    }

    fn enumerated_set(
        &self,
        field: CanonicalField,
        permitted: &[String],
    ) -> Result<Option<Vec<String>>, ValidationReason> {
        let items = match self.value(field) {
            None => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(Self::wrong_type(field)),
        };

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let Value::String(s) = item else {
                return Err(Self::wrong_type(field));
            };
            let value = Self::permitted(field, s, permitted)?;
            if !out.contains(&value) {
                out.push(value);
            }
        }
        out.sort();
        Ok(Some(out))
    }

    fn permitted(field: CanonicalField, raw: &str, permitted: &[String]) -> Result<String, ValidationReason> {
        let value = raw.trim().to_lowercase();
        if value.is_empty() || !Enumerations::permits(permitted, &value) {
            return Err(ValidationReason::NotInEnumeration {
                field: field.name().to_string(),
                value: raw.to_string(),
            });
        }
        Ok(value)
    }
}

/// Accepts `YYYY`, `YYYY-MM` and `YYYY-MM-DD`.
fn parse_year(raw: &str) -> Option<u16> {
    let s = raw.trim();
    let date = match s.len() {
        4 => return s.parse::<u16>().ok(),
        7 => NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()?,
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?,
    };
    u16::try_from(date.year()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_year_accepts_launch_date_shapes() {
        assert_eq!(parse_year("2025"), Some(2025));
        assert_eq!(parse_year("2026-01"), Some(2026));
        assert_eq!(parse_year("2024-09-15"), Some(2024));
        assert_eq!(parse_year("2024-13"), None);
        assert_eq!(parse_year("soon"), None);
    }
}
