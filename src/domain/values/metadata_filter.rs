use crate::domain::error::DomainError;
use crate::domain::values::metadata::{Metadata, MetadataValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Equality filter over document metadata.
///
/// A document matches when every filter key is present in its metadata with a
/// deeply equal value. Missing keys and type mismatches are non-matches, never
/// errors. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataFilter {
    conditions: BTreeMap<String, MetadataValue>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition.
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    /// Parses a filter from a JSON object. Anything else is a `Filter` error.
    pub fn from_json(value: serde_json::Value) -> Result<Self, DomainError> {
        match value {
            serde_json::Value::Object(map) => Ok(Self {
                conditions: map
                    .into_iter()
                    .map(|(k, v)| (k, MetadataValue::from(v)))
                    .collect(),
            }),
            other => Err(DomainError::Filter(format!(
                "metadata filter must be a JSON object, got {other}"
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected))
    }
}
