use docnum::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A catalog entry describing one kind of physical item that documents are
/// issued against.
///
/// Owned and mutated by the catalog collaborator; this crate only reads it.
/// The `matrix` and `drilling_depth` attributes flow into every generated
/// number for the classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Unique business code, the lookup key.
    pub code: String,
    /// Human-readable display name.
    pub name: String,
    /// Matrix code embedded into generated numbers.
    pub matrix: String,
    /// Drilling-depth band, when the product type carries one.
    #[serde(default)]
    pub drilling_depth: Option<String>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub thread_code: Option<String>,
    pub product_type: String,
    pub active: bool,
}

/// Read-only classification lookup by business code.
pub trait ClassificationLookup {
    /// Resolves `code` to its catalog entry, or `None` when the catalog has
    /// no such classification.
    ///
    /// # Errors
    ///
    /// [`StoreError::Transient`](docnum::StoreError::Transient) when the
    /// catalog store is unreachable.
    fn find(&self, code: &str) -> impl Future<Output = Result<Option<ClassificationRecord>>> + Send;
}

impl<L: ClassificationLookup + Sync> ClassificationLookup for &L {
    fn find(&self, code: &str) -> impl Future<Output = Result<Option<ClassificationRecord>>> + Send {
        L::find(self, code)
    }
}

/// In-process [`ClassificationLookup`] backed by a map.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    records: RwLock<HashMap<String, ClassificationRecord>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record under its business code.
    pub fn put(&self, record: ClassificationRecord) {
        self.records.write().insert(record.code.clone(), record);
    }
}

impl ClassificationLookup for MemoryCatalog {
    async fn find(&self, code: &str) -> Result<Option<ClassificationRecord>> {
        Ok(self.records.read().get(code).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str) -> ClassificationRecord {
        ClassificationRecord {
            code: code.to_owned(),
            name: "Core box HQ".to_owned(),
            matrix: "HQ".to_owned(),
            drilling_depth: Some("05-07".to_owned()),
            height: None,
            thread_code: None,
            product_type: "core-box".to_owned(),
            active: true,
        }
    }

    #[tokio::test]
    async fn find_returns_none_for_unknown_code() {
        let catalog = MemoryCatalog::new();
        catalog.put(record("HQ-A"));
        assert!(catalog.find("PQ-Z").await.unwrap().is_none());
        assert_eq!(catalog.find("HQ-A").await.unwrap(), Some(record("HQ-A")));
    }
}
