use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::catalog::Catalog;
use crate::record::{RawRecord, SpecRecord};
use crate::schema::{build_record, CoreSchema, FieldMapping, SchemaError};
use crate::types::diagnostics::{ValidationReason, ValidationWarning};

const RECORD_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Load records from `sources` and validate them against `schema`.
///
/// Never fails: every unusable file or record is excluded and reported.
pub fn load(
    sources: &[PathBuf],
    schema: &CoreSchema,
    mapping: &FieldMapping,
) -> (Catalog, Vec<ValidationWarning>) {
    CatalogLoader::new(schema, mapping).load(sources)
}

/// Read the schema and mapping documents, then load.
///
/// This is the only loading path that can fail, and only when a contract
/// document is unreadable or malformed. `mapping_path = None` uses the
/// identity mapping.
pub fn load_from_documents(
    sources: &[PathBuf],
    schema_path: &Path,
    mapping_path: Option<&Path>,
) -> Result<(Catalog, Vec<ValidationWarning>), SchemaError> {
    let schema = CoreSchema::from_path(schema_path)?;
    let mapping = match mapping_path {
        Some(path) => FieldMapping::from_path(path)?,
        None => FieldMapping::identity(),
    };
    Ok(load(sources, &schema, &mapping))
}

/// CatalogLoader is single-threaded and holds no state between loads.
pub struct CatalogLoader<'a> {
    schema: &'a CoreSchema,
    mapping: &'a FieldMapping,
}

impl<'a> CatalogLoader<'a> {
    pub fn new(schema: &'a CoreSchema, mapping: &'a FieldMapping) -> Self {
        Self { schema, mapping }
    }

    pub fn load(&self, sources: &[PathBuf]) -> (Catalog, Vec<ValidationWarning>) {
        let mut warnings = Vec::new();

        // 1. Expand directories into a deterministic file list
        let files = expand_sources(sources, &mut warnings);

        // 2. Parse documents; one file may hold one record or a list of them
        let mut raw_records = Vec::new();
        for file in &files {
            read_documents(file, &mut raw_records, &mut warnings);
        }

        // 3. Map + validate; first occurrence of an identifier wins
        let mut seen = BTreeSet::new();
        let mut records: Vec<SpecRecord> = Vec::with_capacity(raw_records.len());
        for raw in &raw_records {
            match build_record(raw, self.schema, self.mapping) {
                Ok(record) => {
                    if !seen.insert(record.id.clone()) {
                        warnings.push(ValidationWarning::new(
                            raw.origin(),
                            Some(record.id.clone()),
                            ValidationReason::DuplicateId { id: record.id },
                        ));
                        continue;
                    }
                    debug!(origin = raw.origin(), id = %record.id, "record accepted");
                    records.push(record);
                }
                Err(reason) => {
                    warnings.push(ValidationWarning::new(raw.origin(), None, reason));
                }
            }
        }

        for warning in &warnings {
            warn!(origin = %warning.origin, reason = %warning.reason, "record excluded from catalog");
        }

        let catalog = Catalog::from_records(records, warnings.len());
        info!(
            records = catalog.len(),
            excluded = warnings.len(),
            version = %catalog.version(),
            "catalog loaded"
        );

        (catalog, warnings)
    }
}

fn expand_sources(sources: &[PathBuf], warnings: &mut Vec<ValidationWarning>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for source in sources {
        if !source.is_dir() {
            files.push(source.clone());
            continue;
        }

        let entries = match fs::read_dir(source) {
            Ok(entries) => entries,
            Err(err) => {
                warnings.push(unreadable(source, &err));
                continue;
            }
        };

        let mut found: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_record_extension(path))
            .collect();
        found.sort();
        files.extend(found);
    }

    files
}

fn has_record_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| RECORD_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn read_documents(file: &Path, out: &mut Vec<RawRecord>, warnings: &mut Vec<ValidationWarning>) {
    let origin = file.display().to_string();

    let text = match fs::read_to_string(file) {
        Ok(text) => text,
        Err(err) => {
            warnings.push(unreadable(file, &err));
            return;
        }
    };

    let is_json = file
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let parsed: Result<Value, String> = if is_json {
        serde_json::from_str(&text).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&text).map_err(|e| e.to_string())
    };

    match parsed {
        Ok(Value::Array(items)) => {
            for (i, item) in items.into_iter().enumerate() {
                out.push(RawRecord::new(format!("{origin}#{i}"), item));
            }
        }
        Ok(value) => out.push(RawRecord::new(origin, value)),
        Err(message) => warnings.push(ValidationWarning::new(
            origin,
            None,
            ValidationReason::Unparseable { message },
        )),
    }
}

fn unreadable(path: &Path, err: &std::io::Error) -> ValidationWarning {
    ValidationWarning::new(
        path.display().to_string(),
        None,
        ValidationReason::Unreadable {
            message: err.to_string(),
        },
    )
}
