use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::catalog::catalog::Catalog;
use crate::catalog::loader;
use crate::schema::{CoreSchema, FieldMapping};
use crate::types::diagnostics::ValidationWarning;

/// Anything that can hand out the catalog snapshot for one invocation.
pub trait CatalogProvider {
    fn snapshot(&self) -> Arc<Catalog>;
}

impl CatalogProvider for Arc<Catalog> {
    fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(self)
    }
}

/// Holds the current catalog and swaps it atomically on reload.
///
/// The lock only guards the pointer. Callers that already took a snapshot
/// keep reading their catalog after a swap.
#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Install `catalog` for new invocations; returns the previous one.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, next);
        info!(
            previous = %previous.version(),
            current = %guard.version(),
            "catalog swapped"
        );
        previous
    }

    /// Load a fresh catalog from `sources` and swap it in.
    pub fn reload(
        &self,
        sources: &[PathBuf],
        schema: &CoreSchema,
        mapping: &FieldMapping,
    ) -> Vec<ValidationWarning> {
        let (catalog, warnings) = loader::load(sources, schema, mapping);
        self.replace(catalog);
        warnings
    }
}

impl CatalogProvider for CatalogStore {
    fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}
