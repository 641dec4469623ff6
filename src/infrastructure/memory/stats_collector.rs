use crate::domain::entities::vector_document::VectorDocument;
use crate::domain::ports::document_store::StoreStats;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Running aggregates over the store's contents.
///
/// Mutated only by the store while it holds its write lock, so a snapshot is
/// always consistent with the documents it describes.
#[derive(Debug, Default)]
pub struct StatsCollector {
    count: usize,
    total_dimensions: usize,
    // Multiset of updated_at values; keeps the max exact across deletes.
    updates: BTreeMap<DateTime<Utc>, usize>,
    last_modified: Option<DateTime<Utc>>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_put(&mut self, stored: &VectorDocument, replaced: Option<&VectorDocument>) {
        match replaced {
            Some(old) => {
                self.total_dimensions -= old.dimension();
                self.forget_update(old.updated_at);
            }
            None => self.count += 1,
        }
        self.total_dimensions += stored.dimension();
        *self.updates.entry(stored.updated_at).or_default() += 1;
        self.touch(stored.updated_at);
    }

    pub fn record_delete(&mut self, removed: &VectorDocument, at: DateTime<Utc>) {
        self.count -= 1;
        self.total_dimensions -= removed.dimension();
        self.forget_update(removed.updated_at);
        self.touch(at);
    }

    pub fn reset(&mut self, at: DateTime<Utc>) {
        self.count = 0;
        self.total_dimensions = 0;
        self.updates.clear();
        self.touch(at);
    }

    pub fn snapshot(&self, dimension: Option<usize>) -> StoreStats {
        let average_dimension = if self.count == 0 {
            0.0
        } else {
            self.total_dimensions as f64 / self.count as f64
        };
        StoreStats {
            document_count: self.count,
            dimension,
            average_dimension,
            last_updated: self.updates.keys().next_back().copied(),
            last_modified: self.last_modified,
        }
    }

    fn forget_update(&mut self, at: DateTime<Utc>) {
        if let Some(n) = self.updates.get_mut(&at) {
            *n -= 1;
            if *n == 0 {
                self.updates.remove(&at);
            }
        }
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.last_modified = Some(self.last_modified.map_or(at, |prev| prev.max(at)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::vector_document::NewDocument;
    use chrono::Duration;

    fn doc(id: &str, dims: usize, at: DateTime<Utc>) -> VectorDocument {
        NewDocument::new("content")
            .with_id(id)
            .into_document(vec![1.0; dims], at)
    }

    #[test]
    fn test_put_and_overwrite_counts() {
        let t0 = Utc::now();
        let mut stats = StatsCollector::new();
        let a = doc("a", 3, t0);
        stats.record_put(&a, None);
        let mut a2 = doc("a", 3, t0 + Duration::seconds(5));
        a2.created_at = t0;
        stats.record_put(&a2, Some(&a));

        let snap = stats.snapshot(Some(3));
        assert_eq!(snap.document_count, 1);
        assert_eq!(snap.average_dimension, 3.0);
        assert_eq!(snap.last_updated, Some(t0 + Duration::seconds(5)));
    }

    #[test]
    fn test_delete_falls_back_to_previous_update() {
        let t0 = Utc::now();
        let mut stats = StatsCollector::new();
        let a = doc("a", 2, t0);
        let b = doc("b", 2, t0 + Duration::seconds(1));
        stats.record_put(&a, None);
        stats.record_put(&b, None);
        stats.record_delete(&b, t0 + Duration::seconds(2));

        let snap = stats.snapshot(Some(2));
        assert_eq!(snap.document_count, 1);
        assert_eq!(snap.last_updated, Some(t0));
        assert_eq!(snap.last_modified, Some(t0 + Duration::seconds(2)));
    }

    #[test]
    fn test_reset() {
        let t0 = Utc::now();
        let mut stats = StatsCollector::new();
        stats.record_put(&doc("a", 4, t0), None);
        stats.reset(t0 + Duration::seconds(1));

        let snap = stats.snapshot(None);
        assert_eq!(snap.document_count, 0);
        assert_eq!(snap.average_dimension, 0.0);
        assert!(snap.last_updated.is_none());
        assert!(snap.last_modified.is_some());
    }
}
