//! Minimal, deterministic justification for a scored candidate.
//!
//! Only structured tuples come out of here; wording is left to whatever
//! renders the decision.

use crate::record::AttributeValue;
use crate::types::decision::{Explanation, Risk, ScoredCandidate};

/// The `top_k` breakdown entries with the largest absolute contribution.
///
/// Ties keep the profile's declaration order.
pub fn explain(candidate: &ScoredCandidate, top_k: usize) -> Vec<Explanation> {
    let mut entries: Vec<_> = candidate.breakdown.iter().collect();
    // Stable sort: breakdown is already in declaration order.
    entries.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));

    entries
        .into_iter()
        .take(top_k)
        .map(|entry| Explanation {
            attribute: entry.attribute,
            raw: entry.raw.clone(),
            normalized: entry.normalized,
            contribution: entry.contribution,
            direction: entry.attribute.direction(),
            missing: entry.raw.is_none(),
        })
        .collect()
}

/// Undocumented and unsupported weighted attributes in declaration order,
/// followed by every penalty that matched.
///
/// Unlike [`explain`] this is not truncated, so a gap in the record shows
/// up even when its contribution is zero.
pub fn risks(candidate: &ScoredCandidate) -> Vec<Risk> {
    let gaps = candidate.breakdown.iter().filter_map(|entry| match &entry.raw {
        None => Some(Risk::Undocumented {
            attribute: entry.attribute,
            weight: entry.weight,
        }),
        Some(AttributeValue::Flag(false)) => Some(Risk::Unsupported {
            attribute: entry.attribute,
        }),
        Some(_) => None,
    });

    let penalties = candidate.penalties.iter().map(|penalty| Risk::Penalized {
        attribute: penalty.attribute,
        op: penalty.op,
        value: penalty.value,
        multiplier: penalty.multiplier,
    });

    gaps.chain(penalties).collect()
}
