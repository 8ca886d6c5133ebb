use crate::explain::{explain, risks};
use crate::types::decision::{ScoredCandidate, Slot, SlotPick};

/// Place the top ranked candidates into slots A, B, C.
///
/// Fewer than three candidates fill fewer slots.
pub fn assign_slots(ranked: &[ScoredCandidate], top_k: usize) -> Vec<SlotPick> {
    Slot::ORDER
        .iter()
        .zip(ranked.iter())
        .map(|(&slot, candidate)| {
            let record = candidate.record;
            SlotPick {
                slot,
                id: record.id.clone(),
                brand: record.brand.clone(),
                model: record.model.clone(),
                size_inch: record.size_inch,
                release_year: record.release_year,
                price: record.price,
                input_lag_class: record.input_lag_class(),
                score: candidate.score,
                explanation: explain(candidate, top_k),
                risks: risks(candidate),
            }
        })
        .collect()
}
