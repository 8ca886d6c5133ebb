pub mod decision;
pub mod diagnostics;
pub mod identifiers;

pub use decision::{
    AppliedPenalty, BreakdownEntry, Constraints, Decision, DecisionStatus, Explanation, InputIssue,
    PickRequest, RankedEntry, RankingReport, Risk, ScoredCandidate, SearchReport, Slot, SlotPick,
};
pub use diagnostics::{ValidationReason, ValidationWarning};
pub use identifiers::{CatalogVersion, RecordId, RecordIdError};
