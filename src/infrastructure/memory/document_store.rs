use crate::domain::entities::vector_document::VectorDocument;
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::{DocumentStore, Documents, StoreStats};
use crate::infrastructure::memory::stats_collector::StatsCollector;
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Default)]
struct StoreState {
    docs: IndexMap<String, Arc<VectorDocument>>,
    dimension: Option<usize>,
    stats: StatsCollector,
}

/// Process-local document store.
///
/// All state sits behind one lock: writers (`put`, `delete`, `clear`) are
/// exclusive, so readers never see a half-applied mutation or a dimension that
/// disagrees with the stored vectors.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    state: RwLock<StoreState>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn put(&self, mut document: VectorDocument) -> Result<Arc<VectorDocument>, DomainError> {
        document.validate()?;

        let mut state = self.state.write();
        if let Some(expected) = state.dimension {
            if document.dimension() != expected {
                return Err(DomainError::DimensionMismatch {
                    expected,
                    got: document.dimension(),
                });
            }
        }

        let now = Utc::now();
        let replaced = state.docs.get(&document.id).cloned();
        document.created_at = replaced.as_ref().map_or(now, |old| old.created_at);
        document.updated_at = now.max(document.created_at);

        let stored = Arc::new(document);
        // IndexMap::insert keeps the slot of an existing key.
        state.docs.insert(stored.id.clone(), stored.clone());
        state.dimension = Some(stored.dimension());
        state.stats.record_put(&stored, replaced.as_deref());

        tracing::debug!(
            id = %stored.id,
            overwrite = replaced.is_some(),
            "document stored"
        );
        Ok(stored)
    }

    fn get(&self, id: &str) -> Result<Arc<VectorDocument>, DomainError> {
        self.state
            .read()
            .docs
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("document {id}")))
    }

    fn delete(&self, id: &str) -> Result<(), DomainError> {
        let mut state = self.state.write();
        let removed = state
            .docs
            .shift_remove(id)
            .ok_or_else(|| DomainError::NotFound(format!("document {id}")))?;
        state.stats.record_delete(&removed, Utc::now());
        if state.docs.is_empty() {
            state.dimension = None;
        }
        tracing::debug!(%id, "document deleted");
        Ok(())
    }

    fn all(&self) -> Documents {
        Documents::new(self.state.read().docs.values().cloned().collect())
    }

    fn clear(&self) {
        let mut state = self.state.write();
        let dropped = state.docs.len();
        state.docs.clear();
        state.dimension = None;
        state.stats.reset(Utc::now());
        tracing::info!(dropped, "store cleared");
    }

    fn dimension(&self) -> Option<usize> {
        self.state.read().dimension
    }

    fn stats(&self) -> StoreStats {
        let state = self.state.read();
        state.stats.snapshot(state.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::vector_document::NewDocument;

    fn doc(id: &str, embedding: Vec<f32>) -> VectorDocument {
        NewDocument::new(format!("content of {id}"))
            .with_id(id)
            .into_document(embedding, Utc::now())
    }

    #[test]
    fn test_put_and_get() {
        let store = InMemoryDocumentStore::new();
        store.put(doc("a", vec![1.0, 0.0])).unwrap();
        let got = store.get("a").unwrap();
        assert_eq!(got.embedding, vec![1.0, 0.0]);
        assert!(got.created_at <= got.updated_at);
    }

    #[test]
    fn test_first_put_establishes_dimension() {
        let store = InMemoryDocumentStore::new();
        assert_eq!(store.dimension(), None);
        store.put(doc("a", vec![1.0, 0.0, 0.0])).unwrap();
        assert_eq!(store.dimension(), Some(3));

        let err = store.put(doc("b", vec![1.0, 0.0])).unwrap_err();
        assert!(matches!(err, DomainError::DimensionMismatch { expected: 3, got: 2 }));
        assert!(store.get("b").is_err());
        assert_eq!(store.stats().document_count, 1);
    }

    #[test]
    fn test_overwrite_preserves_created_at_and_position() {
        let store = InMemoryDocumentStore::new();
        let first = store.put(doc("a", vec![1.0])).unwrap();
        store.put(doc("b", vec![2.0])).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = store.put(doc("a", vec![3.0])).unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
        let ids: Vec<_> = store.all().iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.get("a").unwrap().embedding, vec![3.0]);
        assert_eq!(store.stats().document_count, 2);
    }

    #[test]
    fn test_mismatched_overwrite_leaves_original() {
        let store = InMemoryDocumentStore::new();
        store.put(doc("a", vec![1.0, 2.0])).unwrap();
        assert!(store.put(doc("a", vec![1.0, 2.0, 3.0])).is_err());
        assert_eq!(store.get("a").unwrap().embedding, vec![1.0, 2.0]);
    }

    #[test]
    fn test_invalid_document_rejected() {
        let store = InMemoryDocumentStore::new();
        let mut d = doc("a", vec![1.0]);
        d.content = String::new();
        assert!(matches!(store.put(d), Err(DomainError::InvalidDocument(_))));
        assert_eq!(store.dimension(), None);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = InMemoryDocumentStore::new();
        assert!(matches!(store.delete("ghost"), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_delete_keeps_order_and_releases_dimension_when_empty() {
        let store = InMemoryDocumentStore::new();
        for id in ["a", "b", "c"] {
            store.put(doc(id, vec![1.0, 1.0])).unwrap();
        }
        store.delete("b").unwrap();
        let ids: Vec<_> = store.all().iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        store.delete("a").unwrap();
        store.delete("c").unwrap();
        assert_eq!(store.dimension(), None);
        store.put(doc("d", vec![1.0, 1.0, 1.0])).unwrap();
        assert_eq!(store.dimension(), Some(3));
    }

    #[test]
    fn test_snapshot_is_restartable_and_isolated() {
        let store = InMemoryDocumentStore::new();
        store.put(doc("a", vec![1.0])).unwrap();
        let snapshot = store.all();
        store.put(doc("b", vec![1.0])).unwrap();

        assert_eq!(snapshot.iter().count(), 1);
        assert_eq!(snapshot.iter().count(), 1);
        assert_eq!(store.all().len(), 2);
    }

    #[test]
    fn test_clear_resets_everything() {
        let store = InMemoryDocumentStore::new();
        store.put(doc("a", vec![1.0, 2.0])).unwrap();
        store.clear();

        assert!(store.get("a").is_err());
        assert!(store.all().is_empty());
        let stats = store.stats();
        assert_eq!(stats.document_count, 0);
        assert_eq!(stats.dimension, None);
        store.put(doc("b", vec![1.0])).unwrap();
        assert_eq!(store.dimension(), Some(1));
    }
}
