use std::cmp::Ordering;

use crate::config::DEFAULT_NEUTRAL_FLOOR;
use crate::record::attribute::{hdr_format_points, panel_technology_points};
use crate::record::{Attribute, AttributeValue, Direction, Normalization, SpecRecord};
use crate::scene::SceneProfile;
use crate::types::decision::{AppliedPenalty, BreakdownEntry, ScoredCandidate};

/// Map a raw attribute value onto [0, 100].
///
/// Missing values land on `neutral_floor` whatever the attribute's
/// direction, so an undocumented spec is never rewarded.
pub fn normalize(attribute: Attribute, raw: Option<&AttributeValue>, neutral_floor: f64) -> f64 {
    let Some(raw) = raw else {
        return neutral_floor;
    };

    let value = match (attribute.normalization(), raw) {
        (Normalization::Linear { min, max }, AttributeValue::Number(x)) => {
            let fraction = if max > min {
                (x.clamp(min, max) - min) / (max - min)
            } else {
                0.0
            };
            match attribute.direction() {
                Direction::LowerIsBetter => (1.0 - fraction) * 100.0,
                _ => fraction * 100.0,
            }
        }
        (Normalization::Flag, AttributeValue::Flag(b)) => {
            if *b {
                100.0
            } else {
                0.0
            }
        }
        (Normalization::Lookup, AttributeValue::Set(formats)) => {
            formats.iter().map(|f| hdr_format_points(f)).sum::<f64>()
        }
        (Normalization::Lookup, AttributeValue::Text(technology)) => panel_technology_points(technology),
        // Shape mismatch cannot come out of the loader; treat as undocumented.
        _ => neutral_floor,
    };

    value.clamp(0.0, 100.0)
}

pub trait Scorer {
    fn breakdown(&self, record: &SpecRecord, profile: &SceneProfile) -> Vec<BreakdownEntry>;

    fn score_value(&self, breakdown: &[BreakdownEntry]) -> f64 {
        let score: f64 = breakdown.iter().map(|entry| entry.contribution).sum();
        debug_assert!(score >= 0.0, "score {score} is negative");
        score
    }

    /// Breakdown, base score, then every matching penalty multiplied in.
    fn score<'a>(&self, record: &'a SpecRecord, profile: &SceneProfile) -> ScoredCandidate<'a> {
        let breakdown = self.breakdown(record, profile);
        let base_score = self.score_value(&breakdown);

        let mut score = base_score;
        let mut penalties = Vec::new();
        for rule in &profile.penalties {
            let raw = rule.attribute.value_of(record);
            if rule.applies(raw.as_ref()) {
                score *= rule.multiplier;
                penalties.push(AppliedPenalty {
                    attribute: rule.attribute,
                    op: rule.op,
                    value: rule.value,
                    multiplier: rule.multiplier,
                });
            }
        }

        debug_assert!(
            score <= profile.total_weight() + 1e-9,
            "score {score} exceeds total weight {}",
            profile.total_weight()
        );

        ScoredCandidate {
            record,
            scene: profile.name.clone(),
            base_score,
            score,
            breakdown,
            penalties,
        }
    }
}

/// v0: weighted sum of fixed-reference normalizations.
#[derive(Debug, Clone, Copy)]
pub struct WeightedSceneScorer {
    neutral_floor: f64,
}

impl WeightedSceneScorer {
    pub fn new(neutral_floor: f64) -> Self {
        debug_assert!((0.0..100.0).contains(&neutral_floor), "neutral floor {neutral_floor} outside [0, 100)");
        Self { neutral_floor }
    }

    pub fn neutral_floor(&self) -> f64 {
        self.neutral_floor
    }
}

impl Default for WeightedSceneScorer {
    fn default() -> Self {
        Self::new(DEFAULT_NEUTRAL_FLOOR)
    }
}

impl Scorer for WeightedSceneScorer {
    fn breakdown(&self, record: &SpecRecord, profile: &SceneProfile) -> Vec<BreakdownEntry> {
        profile
            .weights
            .iter()
            .map(|w| {
                let raw = w.attribute.value_of(record);
                let normalized = normalize(w.attribute, raw.as_ref(), self.neutral_floor);
                BreakdownEntry {
                    attribute: w.attribute,
                    raw,
                    normalized,
                    weight: w.weight,
                    contribution: normalized * w.weight / 100.0,
                }
            })
            .collect()
    }
}

/// Score every record under `profile`, preserving input order.
pub fn score_all<'a, S: Scorer>(
    scorer: &S,
    records: &[&'a SpecRecord],
    profile: &SceneProfile,
) -> Vec<ScoredCandidate<'a>> {
    records
        .iter()
        .map(|record| scorer.score(record, profile))
        .collect()
}

/// Total order: score desc, then price asc (absent last), then id asc.
pub fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| match (a.record.price, b.record.price) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.record.id.cmp(&b.record.id))
}

pub fn rank(mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates.sort_by(compare_candidates);

    debug_assert!(candidates
        .windows(2)
        .all(|w| compare_candidates(&w[0], &w[1]) != Ordering::Greater));

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_is_better_inverts_the_scale() {
        let lag = |ms: f64| normalize(Attribute::InputLag, Some(&AttributeValue::Number(ms)), 0.0);
        assert_eq!(lag(0.0), 100.0);
        assert_eq!(lag(40.0), 0.0);
        assert_eq!(lag(10.0), 75.0);
        assert_eq!(lag(500.0), 0.0, "values beyond the reference clamp");
    }

    #[test]
    fn missing_value_uses_floor_for_both_directions() {
        assert_eq!(normalize(Attribute::InputLag, None, 0.0), 0.0);
        assert_eq!(normalize(Attribute::PeakBrightness, None, 0.0), 0.0);
        assert_eq!(normalize(Attribute::InputLag, None, 25.0), 25.0);
    }

    #[test]
    fn hdr_points_are_capped() {
        let all = AttributeValue::Set(vec![
            "dolby_vision".into(),
            "hdr10".into(),
            "hdr10_plus".into(),
            "hlg".into(),
        ]);
        assert_eq!(normalize(Attribute::HdrFormats, Some(&all), 0.0), 100.0);

        let empty = AttributeValue::Set(Vec::new());
        assert_eq!(normalize(Attribute::HdrFormats, Some(&empty), 50.0), 0.0);
    }

    #[test]
    fn flags_map_to_extremes() {
        assert_eq!(normalize(Attribute::Vrr, Some(&AttributeValue::Flag(true)), 0.0), 100.0);
        assert_eq!(normalize(Attribute::Vrr, Some(&AttributeValue::Flag(false)), 30.0), 0.0);
    }
}
