use crate::domain::entities::vector_document::VectorDocument;
use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct StoreStats {
    pub document_count: usize,
    /// Established embedding dimension, `None` while the store is empty.
    pub dimension: Option<usize>,
    pub average_dimension: f64,
    /// Most recent `updated_at` across stored documents.
    pub last_updated: Option<DateTime<Utc>>,
    /// Time of the last mutation of any kind, including deletes and clears.
    pub last_modified: Option<DateTime<Utc>>,
}

/// Point-in-time view of the store in insertion order.
///
/// Iteration is lazy and may be restarted any number of times; later store
/// mutations are not visible through an existing snapshot.
#[derive(Debug, Clone, Default)]
pub struct Documents {
    docs: Arc<Vec<Arc<VectorDocument>>>,
}

impl Documents {
    pub fn new(docs: Vec<Arc<VectorDocument>>) -> Self {
        Self { docs: Arc::new(docs) }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<VectorDocument>> + '_ {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl<'a> IntoIterator for &'a Documents {
    type Item = &'a Arc<VectorDocument>;
    type IntoIter = std::slice::Iter<'a, Arc<VectorDocument>>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

pub trait DocumentStore: Send + Sync {
    /// Inserts or overwrites by id. Overwrites keep `created_at` and the
    /// original insertion position.
    fn put(&self, document: VectorDocument) -> Result<Arc<VectorDocument>, DomainError>;
    fn get(&self, id: &str) -> Result<Arc<VectorDocument>, DomainError>;
    /// Removes a document; `NotFound` when the id is absent.
    fn delete(&self, id: &str) -> Result<(), DomainError>;
    fn all(&self) -> Documents;
    /// Empties the store and forgets the established dimension.
    fn clear(&self);
    fn dimension(&self) -> Option<usize>;
    fn stats(&self) -> StoreStats;
}
