use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType, ProviderError};

/// Stand-in used when no provider is configured. Every request is rejected, so
/// callers must supply their own embeddings.
pub struct NoopProvider;

#[async_trait::async_trait]
impl EmbeddingProvider for NoopProvider {
    async fn embed(
        &self,
        _texts: &[String],
        _model: &str,
        _input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        Err(ProviderError::Rejected(
            "no embedding provider configured (set NEURADB_EMBEDDING_PROVIDER)".into(),
        ))
    }

    fn default_model(&self) -> &str {
        "none"
    }

    fn dimension(&self, _model: &str) -> usize {
        0
    }
}
