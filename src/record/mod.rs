pub mod attribute;
pub mod raw;
pub mod record;

pub use crate::types::identifiers::RecordId;
pub use attribute::{Attribute, AttributeValue, Direction, Normalization};
pub use raw::RawRecord;
pub use record::{CanonicalField, FieldKind, InputLagClass, SpecRecord};
