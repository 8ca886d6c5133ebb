pub mod core_schema;
pub mod mapping;
pub mod validate;

pub use core_schema::{CoreSchema, Enumerations, SchemaError, ValueRange};
pub use mapping::FieldMapping;
pub use validate::build_record;
