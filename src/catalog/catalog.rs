// Read-only after construction:
// no mutation
// no "update" methods
// reload builds a new Catalog

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::record::SpecRecord;
use crate::types::identifiers::{CatalogVersion, RecordId};

/// The immutable set of valid records for one run.
#[derive(Debug)]
pub struct Catalog {
    version: CatalogVersion,
    loaded_at: DateTime<Utc>, // informational only
    records: Vec<SpecRecord>,
    index: BTreeMap<RecordId, usize>,
    warning_count: usize,
}

impl Catalog {
    /// Build a catalog from validated records.
    ///
    /// Records are sorted by identifier; if an identifier repeats, the first
    /// occurrence in input order is kept. `warning_count` is the number of
    /// records the loader excluded while producing `records`.
    pub fn from_records(records: Vec<SpecRecord>, warning_count: usize) -> Self {
        let mut index = BTreeMap::new();
        let mut unique = Vec::with_capacity(records.len());
        for record in records {
            if index.contains_key(&record.id) {
                continue;
            }
            index.insert(record.id.clone(), 0);
            unique.push(record);
        }

        unique.sort_by(|a, b| a.id.cmp(&b.id));
        for (pos, record) in unique.iter().enumerate() {
            index.insert(record.id.clone(), pos);
        }

        // Plain data with no maps of non-string keys; serialization cannot fail.
        let bodies: Vec<Vec<u8>> = unique
            .iter()
            .map(|record| serde_json::to_vec(record).unwrap_or_default())
            .collect();
        let version = CatalogVersion::from_lines(
            unique
                .iter()
                .zip(bodies.iter())
                .map(|(record, body)| (record.id.as_str(), body.as_slice())),
        );

        Self {
            version,
            loaded_at: Utc::now(),
            records: unique,
            index,
            warning_count,
        }
    }

    pub fn records(&self) -> &[SpecRecord] {
        &self.records
    }

    pub fn get(&self, id: &RecordId) -> Option<&SpecRecord> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn version(&self) -> &CatalogVersion {
        &self.version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Records excluded during loading. Non-zero means decisions are DEGRADED.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }
}
