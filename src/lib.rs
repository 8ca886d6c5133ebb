//! Deterministic television selection and ranking engine.
//!
//! `tvpick-core` loads a schema-validated catalog of TV spec records,
//! filters it by hard constraints, scores survivors under a named scene
//! profile, ranks them under a total order, and packages the top three into
//! a slotted decision with structured explanations. Identical catalog,
//! profiles and request always produce byte-identical output.

pub mod catalog;
pub mod comparison;
pub mod config;
pub mod error;
pub mod explain;
pub mod record;
pub mod scene;
pub mod schema;
pub mod selection;
pub mod telemetry;
pub mod types;
