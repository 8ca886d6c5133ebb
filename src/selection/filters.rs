use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::record::SpecRecord;
use crate::types::identifiers::RecordId;

/// Hard constraints a record must satisfy to be considered at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSet {
    pub size_inch: u32,
    /// Inclusive: a record matches when `|size - size_inch| <= tolerance_inch`.
    pub tolerance_inch: u32,
    /// Records without a price never pass a budget.
    pub budget: Option<f64>,
    /// Lowercased; empty means any brand.
    pub brands: Vec<String>,
    pub ids: Option<BTreeSet<RecordId>>,
}

impl ConstraintSet {
    pub fn new(size_inch: u32, tolerance_inch: u32) -> Self {
        Self {
            size_inch,
            tolerance_inch,
            budget: None,
            brands: Vec::new(),
            ids: None,
        }
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.brands = brands
            .into_iter()
            .map(|b| b.as_ref().trim().to_lowercase())
            .collect();
        self
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.ids = Some(ids.into_iter().collect());
        self
    }

    pub fn matches(&self, record: &SpecRecord) -> bool {
        if record.size_inch.abs_diff(self.size_inch) > self.tolerance_inch {
            return false;
        }

        if let Some(budget) = self.budget {
            match record.price {
                Some(price) if price <= budget => {}
                _ => return false,
            }
        }

        if !self.brands.is_empty() {
            let brand = record.brand.trim().to_lowercase();
            if !self.brands.iter().any(|b| *b == brand) {
                return false;
            }
        }

        if let Some(ids) = &self.ids {
            if !ids.contains(&record.id) {
                return false;
            }
        }

        true
    }
}

/// Catalog records satisfying `constraints`, in catalog order.
pub fn filter<'a>(catalog: &'a Catalog, constraints: &ConstraintSet) -> Vec<&'a SpecRecord> {
    catalog
        .records()
        .iter()
        .filter(|record| constraints.matches(record))
        .collect()
}
