use serde_json::Value;

/// An untyped record document as read from disk, before field mapping.
///
/// YAML and JSON sources both land here as a `serde_json::Value` tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    origin: String,
    inner: Value,
}

impl RawRecord {
    pub fn new(origin: impl Into<String>, inner: Value) -> Self {
        RawRecord {
            origin: origin.into(),
            inner,
        }
    }

    /// Where this record came from: `path` or `path#index`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Resolve a dotted path such as `meta.price_cny`.
    ///
    /// Explicit `null` is reported as absent, same as a missing key.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current = &self.inner;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }

        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    /// First non-null value among `paths`, in order.
    pub fn first_of<'a>(&'a self, paths: &[String]) -> Option<&'a Value> {
        paths.iter().find_map(|path| self.lookup(path))
    }

    pub fn is_document(&self) -> bool {
        self.inner.is_object()
    }
}
