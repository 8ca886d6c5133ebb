pub mod matrix;

pub use matrix::{compare, CompareError, ComparisonColumn, ComparisonMatrix, ComparisonRow, UnknownId};
