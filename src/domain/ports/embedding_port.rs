use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Document,
    Query,
}

/// Failure reported by an embedding provider.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Worth retrying: network failures, rate limits, server errors.
    #[error("transient: {0}")]
    Transient(String),
    /// The provider refused the request or answered with garbage.
    #[error("rejected: {0}")]
    Rejected(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }

    /// Classifies an HTTP failure status.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 || status >= 500 {
            ProviderError::Transient(format!("HTTP {status}: {body}"))
        } else {
            ProviderError::Rejected(format!("HTTP {status}: {body}"))
        }
    }
}

#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(
        &self,
        texts: &[String],
        model: &str,
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, ProviderError>;

    fn default_model(&self) -> &str;

    /// Output dimension for `model`, or 0 when unknown.
    fn dimension(&self, model: &str) -> usize;
}
