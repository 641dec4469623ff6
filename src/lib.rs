pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::embedding_gateway::EmbeddingGateway;
use crate::application::ingest::{AddManyOptions, AddOptions, IngestSummary, IngestionPipeline};
use crate::application::search::{SearchEngine, SearchOptions, SearchQuery, SearchResult};
use crate::config::{NeuraDbConfig, ProviderKind};
use crate::domain::entities::vector_document::{NewDocument, VectorDocument};
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::{DocumentStore, Documents, StoreStats};
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::infrastructure::embeddings::noop::NoopProvider;
use crate::infrastructure::embeddings::openai::OpenAiProvider;
use crate::infrastructure::embeddings::voyage::VoyageProvider;
use crate::infrastructure::memory::document_store::InMemoryDocumentStore;
use std::sync::Arc;

pub struct NeuraDb {
    store: Arc<dyn DocumentStore>,
    gateway: Arc<EmbeddingGateway>,
    pipeline: IngestionPipeline,
    engine: SearchEngine,
}

impl NeuraDb {
    /// Builds a store configured from `NEURADB_*` environment variables.
    pub fn new() -> Result<Self, DomainError> {
        Self::with_config(NeuraDbConfig::from_env()?)
    }

    pub fn with_config(config: NeuraDbConfig) -> Result<Self, DomainError> {
        let embedder: Arc<dyn EmbeddingProvider> = match config.provider {
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
                config.api_key.clone(),
                config.embedding_model.clone(),
                config.base_url.clone(),
            )),
            ProviderKind::Voyage => Arc::new(VoyageProvider::new(
                config.api_key.clone(),
                config.embedding_model.clone(),
                config.base_url.clone(),
            )),
            ProviderKind::Noop => Arc::new(NoopProvider),
        };
        if config.provider != ProviderKind::Noop && config.api_key.is_empty() {
            tracing::warn!(provider = ?config.provider, "no embedding API key set");
        }

        Self::with_provider(embedder, config)
    }

    pub fn with_provider(
        embedder: Arc<dyn EmbeddingProvider>,
        config: NeuraDbConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let gateway = Arc::new(EmbeddingGateway::new(embedder, &config));

        Ok(Self {
            pipeline: IngestionPipeline::new(
                store.clone(),
                gateway.clone(),
                config.default_batch_size,
                config.max_concurrency,
            ),
            engine: SearchEngine::new(store.clone(), gateway.clone()),
            store,
            gateway,
        })
    }

    pub async fn add_document(
        &self,
        document: NewDocument,
        options: AddOptions,
    ) -> Result<Arc<VectorDocument>, DomainError> {
        self.pipeline.add_one(document, &options).await
    }

    pub async fn add_documents(
        &self,
        documents: Vec<NewDocument>,
        options: AddManyOptions,
    ) -> Result<IngestSummary, DomainError> {
        self.pipeline.add_many(documents, options).await
    }

    pub async fn search(
        &self,
        query: impl Into<SearchQuery>,
        options: SearchOptions,
    ) -> Result<Vec<SearchResult>, DomainError> {
        self.engine.search(query.into(), &options).await
    }

    pub fn get_document(&self, id: &str) -> Result<Arc<VectorDocument>, DomainError> {
        self.store.get(id)
    }

    pub fn delete_document(&self, id: &str) -> Result<(), DomainError> {
        self.store.delete(id)
    }

    /// Snapshot of every document in insertion order.
    pub fn documents(&self) -> Documents {
        self.store.all()
    }

    pub fn clear(&self) {
        self.store.clear()
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    pub fn embedding_model(&self) -> String {
        self.gateway.model()
    }

    /// Changes the model used by future embedding requests. Stored documents
    /// keep their existing vectors.
    pub fn set_embedding_model(&self, model: impl Into<String>) {
        let model = model.into();
        let new_dim = self.gateway.dimension_for(&model);
        if let Some(stored_dim) = self.store.dimension() {
            if new_dim > 0 && new_dim != stored_dim {
                tracing::warn!(
                    %model,
                    stored_dim,
                    new_dim,
                    "new embedding model produces a different dimension than stored documents; clear the store before adding more"
                );
            }
        }
        self.gateway.set_model(model);
    }
}
