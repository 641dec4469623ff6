use crate::application::embedding_gateway::EmbeddingGateway;
use crate::domain::entities::vector_document::{NewDocument, VectorDocument};
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::ports::embedding_port::InputType;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Called after each chunk with cumulative `(processed, total)`.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

#[derive(Debug, Clone, Copy, Default)]
pub struct AddOptions {
    /// Ask the provider for an embedding when the document has none.
    pub create_embedding: bool,
}

impl AddOptions {
    pub fn with_embeddings() -> Self {
        Self {
            create_embedding: true,
        }
    }
}

#[derive(Clone, Default)]
pub struct AddManyOptions {
    pub create_embedding: bool,
    /// Chunk size; `None` uses the configured default.
    pub batch_size: Option<usize>,
    pub on_progress: Option<ProgressCallback>,
    /// Checked before each chunk's embedding request starts. Chunks already
    /// started are still committed and reported.
    pub cancel: Option<CancellationToken>,
}

impl AddManyOptions {
    pub fn with_embeddings(mut self) -> Self {
        self.create_embedding = true;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl fmt::Debug for AddManyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddManyOptions")
            .field("create_embedding", &self.create_embedding)
            .field("batch_size", &self.batch_size)
            .field("on_progress", &self.on_progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedDocument {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestSummary {
    pub total: usize,
    pub inserted: usize,
    pub failed: Vec<FailedDocument>,
    /// Ids never attempted because the run was cancelled.
    pub skipped: Vec<String>,
    pub cancelled: bool,
}

impl IngestSummary {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.inserted == self.total
    }
}

enum Prepared {
    Ready(NewDocument, Vec<f32>),
    Failed(FailedDocument),
}

impl Prepared {
    fn failed(doc: &NewDocument, reason: impl Into<String>) -> Self {
        Prepared::Failed(FailedDocument {
            id: doc.id.clone().unwrap_or_default(),
            reason: reason.into(),
        })
    }
}

pub struct IngestionPipeline {
    store: Arc<dyn DocumentStore>,
    gateway: Arc<EmbeddingGateway>,
    default_batch_size: usize,
    max_concurrency: usize,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        gateway: Arc<EmbeddingGateway>,
        default_batch_size: usize,
        max_concurrency: usize,
    ) -> Self {
        Self {
            store,
            gateway,
            default_batch_size,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Adds a single document. Nothing is stored unless every step succeeds.
    pub async fn add_one(
        &self,
        mut document: NewDocument,
        options: &AddOptions,
    ) -> Result<Arc<VectorDocument>, DomainError> {
        document.ensure_id();
        document.validate()?;

        let embedding = match document.embedding.take() {
            Some(embedding) => embedding,
            None if options.create_embedding => {
                let mut vectors = self
                    .gateway
                    .embed(&[document.content.clone()], InputType::Document)
                    .await?;
                vectors.pop().ok_or_else(|| {
                    DomainError::EmbeddingProvider("provider returned no embedding".into())
                })?
            }
            None => return Err(missing_embedding(&document)),
        };

        self.store.put(document.into_document(embedding, Utc::now()))
    }

    /// Adds documents chunk by chunk, isolating failures per chunk.
    ///
    /// Embedding requests for up to `max_concurrency` chunks overlap, but
    /// chunks are committed and reported strictly in input order.
    /// Cancelling stops further chunks from starting; chunks whose requests
    /// already started are still committed.
    pub async fn add_many(
        &self,
        mut documents: Vec<NewDocument>,
        options: AddManyOptions,
    ) -> Result<IngestSummary, DomainError> {
        if documents.is_empty() {
            return Err(DomainError::InvalidInput("no documents to add".into()));
        }
        let batch_size = options.batch_size.unwrap_or(self.default_batch_size);
        if batch_size == 0 {
            return Err(DomainError::InvalidInput(
                "batch size must be greater than 0".into(),
            ));
        }

        for doc in documents.iter_mut() {
            doc.ensure_id();
        }
        let total = documents.len();
        let mut summary = IngestSummary {
            total,
            ..IngestSummary::default()
        };

        let chunks = split_chunks(documents, batch_size);
        let chunk_ids: Vec<Vec<String>> = chunks
            .iter()
            .map(|chunk| chunk.iter().filter_map(|d| d.id.clone()).collect())
            .collect();
        let chunk_count = chunks.len();
        tracing::info!(total, batch_size, chunk_count, "batch ingestion started");

        let create_embedding = options.create_embedding;
        let cancel = options.cancel.clone();
        let prepared = stream::iter(chunks)
            .map(|chunk| {
                // Evaluated as the chunk enters the window, in chunk order.
                let start = !cancel.as_ref().is_some_and(|t| t.is_cancelled());
                async move {
                    if start {
                        Some(self.prepare_chunk(chunk, create_embedding).await)
                    } else {
                        None
                    }
                }
            })
            .buffered(self.max_concurrency);
        let mut prepared = std::pin::pin!(prepared);

        let mut processed = 0;
        for (index, ids) in chunk_ids.iter().enumerate() {
            let Some(outcome) = prepared.next().await else {
                break;
            };
            let Some(outcomes) = outcome else {
                summary.cancelled = true;
                summary.skipped.extend(ids.iter().cloned());
                continue;
            };

            let before = summary.inserted;
            self.commit_chunk(outcomes, &mut summary);
            processed += ids.len();

            tracing::debug!(
                chunk = index + 1,
                chunk_count,
                inserted = summary.inserted - before,
                processed,
                total,
                "chunk committed"
            );
            if let Some(callback) = &options.on_progress {
                callback(processed, total);
            }
        }

        if summary.cancelled {
            tracing::info!(
                processed,
                skipped = summary.skipped.len(),
                "batch ingestion cancelled"
            );
        }
        tracing::info!(
            inserted = summary.inserted,
            failed = summary.failed_count(),
            cancelled = summary.cancelled,
            "batch ingestion finished"
        );
        Ok(summary)
    }

    /// Validates a chunk and resolves its embeddings with one gateway call.
    async fn prepare_chunk(&self, chunk: Vec<NewDocument>, create_embedding: bool) -> Vec<Prepared> {
        let mut outcomes = Vec::with_capacity(chunk.len());
        let mut pending = Vec::new();

        for mut doc in chunk {
            if let Err(e) = doc.validate() {
                outcomes.push(Prepared::failed(&doc, e.to_string()));
                continue;
            }
            match doc.embedding.take() {
                Some(embedding) => outcomes.push(Prepared::Ready(doc, embedding)),
                None if create_embedding => {
                    pending.push(outcomes.len());
                    outcomes.push(Prepared::Ready(doc, Vec::new()));
                }
                None => {
                    let reason = missing_embedding(&doc).to_string();
                    outcomes.push(Prepared::failed(&doc, reason));
                }
            }
        }

        if pending.is_empty() {
            return outcomes;
        }

        let texts: Vec<String> = pending
            .iter()
            .filter_map(|&i| match &outcomes[i] {
                Prepared::Ready(doc, _) => Some(doc.content.clone()),
                Prepared::Failed(_) => None,
            })
            .collect();

        match self.gateway.embed(&texts, InputType::Document).await {
            Ok(vectors) => {
                for (&i, vector) in pending.iter().zip(vectors) {
                    if let Prepared::Ready(_, embedding) = &mut outcomes[i] {
                        *embedding = vector;
                    }
                }
                outcomes
            }
            Err(e) => {
                // The whole chunk fails together; documents that were already
                // invalid keep their own reason.
                let reason = e.to_string();
                tracing::warn!(documents = outcomes.len(), error = %reason, "chunk embedding failed");
                outcomes
                    .into_iter()
                    .map(|outcome| match outcome {
                        Prepared::Ready(doc, _) => Prepared::failed(&doc, reason.clone()),
                        failed => failed,
                    })
                    .collect()
            }
        }
    }

    fn commit_chunk(&self, outcomes: Vec<Prepared>, summary: &mut IngestSummary) {
        let now = Utc::now();
        for outcome in outcomes {
            match outcome {
                Prepared::Ready(doc, embedding) => {
                    let id = doc.id.clone().unwrap_or_default();
                    match self.store.put(doc.into_document(embedding, now)) {
                        Ok(_) => summary.inserted += 1,
                        Err(e) => summary.failed.push(FailedDocument {
                            id,
                            reason: e.to_string(),
                        }),
                    }
                }
                Prepared::Failed(failure) => summary.failed.push(failure),
            }
        }
    }
}

fn missing_embedding(doc: &NewDocument) -> DomainError {
    DomainError::InvalidDocument(format!(
        "document {}: no embedding supplied and create_embedding is off",
        doc.id.as_deref().unwrap_or_default()
    ))
}

fn split_chunks(documents: Vec<NewDocument>, size: usize) -> Vec<Vec<NewDocument>> {
    let mut chunks = Vec::with_capacity(documents.len().div_ceil(size));
    let mut iter = documents.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_chunks_keeps_order() {
        let docs: Vec<NewDocument> = (0..5)
            .map(|i| NewDocument::new(format!("doc {i}")).with_id(i.to_string()))
            .collect();
        let chunks = split_chunks(docs, 2);
        let sizes: Vec<_> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(chunks[2][0].id.as_deref(), Some("4"));
    }

    #[test]
    fn test_summary_success_flag() {
        let summary = IngestSummary {
            total: 2,
            inserted: 2,
            ..IngestSummary::default()
        };
        assert!(summary.is_complete_success());
        assert_eq!(summary.failed_count(), 0);
    }
}
