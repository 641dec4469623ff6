use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("Filter error: {0}")]
    Filter(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),
}
