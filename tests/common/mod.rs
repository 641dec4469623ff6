//! Shared test helpers.
#![allow(dead_code)]

use neuradb::config::{NeuraDbConfig, RetryPolicy};
use neuradb::domain::entities::vector_document::NewDocument;
use neuradb::domain::ports::embedding_port::{EmbeddingProvider, InputType, ProviderError};
use neuradb::infrastructure::embeddings::noop::NoopProvider;
use neuradb::NeuraDb;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn config() -> NeuraDbConfig {
    NeuraDbConfig {
        retry: RetryPolicy::no_delay(3),
        ..NeuraDbConfig::default()
    }
}

pub fn setup() -> NeuraDb {
    NeuraDb::with_provider(Arc::new(NoopProvider), config()).unwrap()
}

pub fn setup_with(provider: Arc<ScriptedProvider>) -> NeuraDb {
    NeuraDb::with_provider(provider, config()).unwrap()
}

pub fn doc(id: &str, embedding: Vec<f32>) -> NewDocument {
    NewDocument::new(format!("content of {id}"))
        .with_id(id)
        .with_embedding(embedding)
}

/// Keyword axes used by `ScriptedProvider::vector_for`.
pub const AXES: [&str; 3] = ["rust", "python", "cooking"];

/// Deterministic provider: one axis per keyword in `AXES` plus a constant
/// component, so related texts land near each other.
#[derive(Default)]
pub struct ScriptedProvider {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    reject_marker: Option<String>,
    transient_failures: AtomicUsize,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    short_response: bool,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any request containing a text with `marker`.
    pub fn rejecting(mut self, marker: &str) -> Self {
        self.reject_marker = Some(marker.to_string());
        self
    }

    /// Fails the first `n` requests with a transient error.
    pub fn transient_failures(self, n: usize) -> Self {
        self.transient_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answers with one vector fewer than requested.
    pub fn short_response(mut self) -> Self {
        self.short_response = true;
        self
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut v: Vec<f32> = AXES
            .iter()
            .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
            .collect();
        v.push(0.1);
        v
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for ScriptedProvider {
    async fn embed(
        &self,
        texts: &[String],
        model: &str,
        _input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), texts.to_vec()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ProviderError::Transient("HTTP 429: slow down".into()));
        }
        if let Some(marker) = &self.reject_marker {
            if texts.iter().any(|t| t.contains(marker.as_str())) {
                return Err(ProviderError::Rejected(format!("HTTP 400: refused {marker}")));
            }
        }

        let mut vectors: Vec<Vec<f32>> = texts.iter().map(|t| Self::vector_for(t)).collect();
        if self.short_response {
            vectors.pop();
        }
        Ok(vectors)
    }

    fn default_model(&self) -> &str {
        "scripted-small"
    }

    fn dimension(&self, model: &str) -> usize {
        match model {
            "scripted-small" => 4,
            "scripted-large" => 8,
            _ => 0,
        }
    }
}
