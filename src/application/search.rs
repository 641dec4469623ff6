use crate::application::embedding_gateway::EmbeddingGateway;
use crate::config::DEFAULT_SEARCH_LIMIT;
use crate::domain::entities::vector_document::VectorDocument;
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::ports::embedding_port::InputType;
use crate::domain::values::metadata_filter::MetadataFilter;
use crate::domain::values::similarity_method::SimilarityMethod;
use crate::domain::values::vector_math;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    /// Raw text, embedded through the gateway before scanning.
    Text(String),
    Vector(Vec<f32>),
}

impl From<&str> for SearchQuery {
    fn from(text: &str) -> Self {
        SearchQuery::Text(text.to_string())
    }
}

impl From<String> for SearchQuery {
    fn from(text: String) -> Self {
        SearchQuery::Text(text)
    }
}

impl From<Vec<f32>> for SearchQuery {
    fn from(vector: Vec<f32>) -> Self {
        SearchQuery::Vector(vector)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub limit: usize,
    /// Lower bound for cosine/dot, upper bound for Euclidean.
    pub threshold: Option<f64>,
    pub similarity_method: SimilarityMethod,
    pub metadata_filter: Option<MetadataFilter>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            threshold: None,
            similarity_method: SimilarityMethod::default(),
            metadata_filter: None,
        }
    }
}

impl SearchOptions {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn method(mut self, method: SimilarityMethod) -> Self {
        self.similarity_method = method;
        self
    }

    pub fn filter(mut self, filter: MetadataFilter) -> Self {
        self.metadata_filter = Some(filter);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.limit == 0 {
            return Err(DomainError::InvalidInput("limit must be greater than 0".into()));
        }
        if let Some(t) = self.threshold {
            if !t.is_finite() {
                return Err(DomainError::InvalidInput(format!("threshold must be finite, got {t}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub document: Arc<VectorDocument>,
    pub score: f64,
}

/// Exact linear-scan search over the store.
pub struct SearchEngine {
    store: Arc<dyn DocumentStore>,
    gateway: Arc<EmbeddingGateway>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn DocumentStore>, gateway: Arc<EmbeddingGateway>) -> Self {
        Self { store, gateway }
    }

    pub async fn search(
        &self,
        query: SearchQuery,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, DomainError> {
        options.validate()?;
        let vector = self.resolve(query).await?;
        self.rank(&vector, options)
    }

    async fn resolve(&self, query: SearchQuery) -> Result<Vec<f32>, DomainError> {
        match query {
            SearchQuery::Vector(vector) => {
                if vector.iter().any(|v| !v.is_finite()) {
                    return Err(DomainError::InvalidInput(
                        "query vector contains non-finite values".into(),
                    ));
                }
                Ok(vector)
            }
            SearchQuery::Text(text) => {
                if text.trim().is_empty() {
                    return Err(DomainError::InvalidInput("query text must not be empty".into()));
                }
                let mut vectors = self.gateway.embed(&[text], InputType::Query).await?;
                vectors.pop().ok_or_else(|| {
                    DomainError::EmbeddingProvider("provider returned no embedding".into())
                })
            }
        }
    }

    /// Scores every document in one snapshot. O(n) in the document count.
    pub fn rank(&self, vector: &[f32], options: &SearchOptions) -> Result<Vec<SearchResult>, DomainError> {
        let snapshot = self.store.all();
        // Every document in a snapshot shares one dimension, so check once.
        let Some(expected) = snapshot.iter().next().map(|d| d.dimension()) else {
            return Ok(Vec::new());
        };
        if vector.len() != expected {
            return Err(DomainError::DimensionMismatch {
                expected,
                got: vector.len(),
            });
        }

        let method = options.similarity_method;
        let filter = options.metadata_filter.as_ref().filter(|f| !f.is_empty());
        let mut results = Vec::new();
        for doc in snapshot.iter() {
            if let Some(filter) = filter {
                if !filter.matches(&doc.metadata) {
                    continue;
                }
            }
            let score = vector_math::score(method, vector, &doc.embedding)?;
            if let Some(threshold) = options.threshold {
                if !method.passes(score, threshold) {
                    continue;
                }
            }
            results.push(SearchResult {
                document: doc.clone(),
                score,
            });
        }

        // Stable sort: equal scores stay in insertion order.
        results.sort_by(|a, b| {
            let ord = a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal);
            if method.is_distance() {
                ord
            } else {
                ord.reverse()
            }
        });
        results.truncate(options.limit);

        tracing::debug!(
            scanned = snapshot.len(),
            returned = results.len(),
            %method,
            "search complete"
        );
        Ok(results)
    }
}
