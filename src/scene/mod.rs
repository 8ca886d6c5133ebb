pub mod profile;

pub use profile::{AttributeWeight, PenaltyOp, PenaltyRule, ProfileError, SceneProfile, SceneProfiles};
