use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::error::ErrorCode;
use crate::record::{Attribute, AttributeValue, Direction, InputLagClass, SpecRecord};
use crate::types::identifiers::{CatalogVersion, RecordId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    #[error("comparison needs at least 2 distinct identifiers, got {0}")]
    TooFewIds(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonColumn {
    pub id: RecordId,
    pub brand: String,
    pub model: String,
    pub size_inch: u32,
    pub release_year: u16,
    pub input_lag_class: Option<InputLagClass>,
}

/// One attribute across every requested record.
///
/// `best`/`worst` are sorted ids; both are empty for categorical rows,
/// rows with fewer than two documented values, and rows where every
/// documented value is equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub attribute: Attribute,
    pub direction: Direction,
    /// Raw values, aligned with `ComparisonMatrix::columns`.
    pub cells: Vec<Option<AttributeValue>>,
    pub best: Vec<RecordId>,
    pub worst: Vec<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownId {
    pub code: ErrorCode,
    pub id: RecordId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMatrix {
    pub catalog_version: CatalogVersion,
    pub columns: Vec<ComparisonColumn>,
    pub rows: Vec<ComparisonRow>,
    pub unknown_ids: Vec<UnknownId>,
}

/// Side-by-side raw attributes for `ids`, columns in first-seen input order.
///
/// Unknown ids are reported and skipped; repeated ids are compared once.
pub fn compare(catalog: &Catalog, ids: &[RecordId]) -> Result<ComparisonMatrix, CompareError> {
    let mut seen = BTreeSet::new();
    let distinct: Vec<&RecordId> = ids.iter().filter(|id| seen.insert(*id)).collect();
    if distinct.len() < 2 {
        return Err(CompareError::TooFewIds(distinct.len()));
    }

    let mut records: Vec<&SpecRecord> = Vec::with_capacity(distinct.len());
    let mut unknown_ids = Vec::new();
    for id in distinct {
        match catalog.get(id) {
            Some(record) => records.push(record),
            None => unknown_ids.push(UnknownId {
                code: ErrorCode::UnknownId,
                id: id.clone(),
            }),
        }
    }

    let rows = Attribute::ALL
        .iter()
        .map(|&attribute| build_row(attribute, &records))
        .collect();

    let columns = records
        .iter()
        .map(|r| ComparisonColumn {
            id: r.id.clone(),
            brand: r.brand.clone(),
            model: r.model.clone(),
            size_inch: r.size_inch,
            release_year: r.release_year,
            input_lag_class: r.input_lag_class(),
        })
        .collect();

    Ok(ComparisonMatrix {
        catalog_version: catalog.version().clone(),
        columns,
        rows,
        unknown_ids,
    })
}

fn build_row(attribute: Attribute, records: &[&SpecRecord]) -> ComparisonRow {
    let cells: Vec<Option<AttributeValue>> =
        records.iter().map(|r| attribute.value_of(r)).collect();
    let direction = attribute.direction();

    let (best, worst) = match direction {
        Direction::Categorical => (Vec::new(), Vec::new()),
        Direction::HigherIsBetter | Direction::LowerIsBetter => {
            let present: Vec<(&RecordId, f64)> = records
                .iter()
                .zip(&cells)
                .filter_map(|(r, cell)| Some((&r.id, cell.as_ref()?.as_ordinal()?)))
                .collect();
            markers(&present, direction)
        }
    };

    ComparisonRow {
        attribute,
        direction,
        cells,
        best,
        worst,
    }
}

fn markers(present: &[(&RecordId, f64)], direction: Direction) -> (Vec<RecordId>, Vec<RecordId>) {
    if present.len() < 2 {
        return (Vec::new(), Vec::new());
    }

    let max = present.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let min = present.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    if max == min {
        return (Vec::new(), Vec::new());
    }

    let (best_value, worst_value) = match direction {
        Direction::LowerIsBetter => (min, max),
        _ => (max, min),
    };

    let ids_at = |target: f64| {
        let mut ids: Vec<RecordId> = present
            .iter()
            .filter(|(_, v)| *v == target)
            .map(|(id, _)| (*id).clone())
            .collect();
        ids.sort();
        ids
    };

    (ids_at(best_value), ids_at(worst_value))
}
