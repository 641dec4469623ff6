use crate::domain::error::DomainError;
use crate::domain::values::metadata::{Metadata, MetadataValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored document. Timestamps are owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorDocument {
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VectorDocument {
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Checks the fields every stored document must satisfy.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_identity(&self.id, &self.content)?;
        validate_embedding(&self.id, &self.embedding)
    }
}

/// Ingestion input: what a caller supplies before the store stamps it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    #[serde(default)]
    pub id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl NewDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Fills in a generated id when the caller left it out.
    pub fn ensure_id(&mut self) -> &str {
        self.id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .as_str()
    }

    /// Validates id and content without looking at the embedding.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_identity(self.id.as_deref().unwrap_or_default(), &self.content)
    }

    /// Stamps the document with `now`. The store replaces `created_at` on
    /// overwrite so the original creation time survives.
    pub fn into_document(self, embedding: Vec<f32>, now: DateTime<Utc>) -> VectorDocument {
        VectorDocument {
            id: self.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            content: self.content,
            embedding,
            metadata: self.metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

fn validate_identity(id: &str, content: &str) -> Result<(), DomainError> {
    if id.trim().is_empty() {
        return Err(DomainError::InvalidDocument("id must not be empty".into()));
    }
    if content.trim().is_empty() {
        return Err(DomainError::InvalidDocument(format!(
            "document {id}: content must not be empty"
        )));
    }
    Ok(())
}

fn validate_embedding(id: &str, embedding: &[f32]) -> Result<(), DomainError> {
    if embedding.is_empty() {
        return Err(DomainError::InvalidDocument(format!(
            "document {id}: embedding must not be empty"
        )));
    }
    if let Some(pos) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(DomainError::InvalidDocument(format!(
            "document {id}: embedding has a non-finite value at index {pos}"
        )));
    }
    Ok(())
}
