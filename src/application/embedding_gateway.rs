use crate::config::{NeuraDbConfig, RetryPolicy};
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType, ProviderError};
use parking_lot::RwLock;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// The one place the core talks to an embedding provider.
///
/// Splits large inputs into provider-sized requests, retries transient
/// failures with capped exponential backoff, and bounds how many requests are
/// in flight at once across every caller sharing the gateway.
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
    model: RwLock<String>,
    retry: RetryPolicy,
    max_batch_size: usize,
    permits: Semaphore,
}

impl EmbeddingGateway {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: &NeuraDbConfig) -> Self {
        let model = config
            .embedding_model
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string());
        Self {
            provider,
            model: RwLock::new(model),
            retry: config.retry.clone(),
            max_batch_size: config.embed_batch_limit.max(1),
            permits: Semaphore::new(config.max_concurrency.max(1)),
        }
    }

    pub fn model(&self) -> String {
        self.model.read().clone()
    }

    /// Switches the model used by later calls. Requests already running keep
    /// the model they started with.
    pub fn set_model(&self, model: impl Into<String>) {
        let model = model.into();
        tracing::info!(%model, "embedding model changed");
        *self.model.write() = model;
    }

    /// Dimension the provider reports for `model`, 0 when unknown.
    pub fn dimension_for(&self, model: &str) -> usize {
        self.provider.dimension(model)
    }

    /// Embeds `texts`, returning one vector per input in input order.
    pub async fn embed(
        &self,
        texts: &[String],
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.model();

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.max_batch_size) {
            vectors.extend(self.embed_batch(batch, &model, input_type).await?);
        }

        let dim = vectors[0].len();
        if let Some(bad) = vectors.iter().position(|v| v.len() != dim) {
            return Err(DomainError::EmbeddingProvider(format!(
                "provider returned mixed dimensions: {} at position 0, {} at position {bad}",
                dim,
                vectors[bad].len()
            )));
        }
        Ok(vectors)
    }

    async fn embed_batch(
        &self,
        batch: &[String],
        model: &str,
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| DomainError::EmbeddingProvider(format!("gateway closed: {e}")))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.provider.embed(batch, model, input_type).await {
                Ok(vectors) => return check_response(batch.len(), vectors),
                Err(ProviderError::Transient(reason)) if attempt < self.retry.max_attempts => {
                    let delay = self.backoff(attempt - 1);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        %reason,
                        "transient embedding failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "embedding request failed");
                    return Err(DomainError::EmbeddingProvider(format!(
                        "{e} (after {attempt} attempt(s))"
                    )));
                }
            }
        }
    }

    fn backoff(&self, retry: u32) -> Duration {
        let delay = self.retry.delay_for(retry);
        if !self.retry.jitter || delay.is_zero() {
            return delay;
        }
        // Full jitter: anywhere between zero and the computed delay.
        let millis = delay.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
    }
}

fn check_response(expected: usize, vectors: Vec<Vec<f32>>) -> Result<Vec<Vec<f32>>, DomainError> {
    if vectors.len() != expected {
        return Err(DomainError::EmbeddingProvider(format!(
            "provider returned {} embeddings for {expected} inputs",
            vectors.len()
        )));
    }
    if let Some(pos) = vectors.iter().position(|v| v.is_empty()) {
        return Err(DomainError::EmbeddingProvider(format!(
            "provider returned an empty embedding at position {pos}"
        )));
    }
    Ok(vectors)
}
