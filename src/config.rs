//! Runtime configuration, read from `NEURADB_*` environment variables.

use crate::domain::error::DomainError;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Backoff schedule for transient provider failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0 for the first retry).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub fn no_delay(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Voyage,
    Noop,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "voyage" => Ok(ProviderKind::Voyage),
            "noop" | "none" | "" => Ok(ProviderKind::Noop),
            _ => Err(format!("Unknown embedding provider: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeuraDbConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    /// `None` uses the provider's default model.
    pub embedding_model: Option<String>,
    pub base_url: Option<String>,
    /// Chunk size for `add_documents` when the caller does not pick one.
    pub default_batch_size: usize,
    /// Chunks whose embeddings may be requested at the same time.
    pub max_concurrency: usize,
    /// Largest number of texts sent in one provider request.
    pub embed_batch_limit: usize,
    pub retry: RetryPolicy,
}

impl Default for NeuraDbConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Noop,
            api_key: String::new(),
            embedding_model: None,
            base_url: None,
            default_batch_size: DEFAULT_BATCH_SIZE,
            max_concurrency: 4,
            embed_batch_limit: 100,
            retry: RetryPolicy::default(),
        }
    }
}

impl NeuraDbConfig {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let defaults = Self::default();

        let provider = match lookup("NEURADB_EMBEDDING_PROVIDER") {
            Some(p) => p.parse().map_err(DomainError::Config)?,
            None => defaults.provider,
        };

        let retry = RetryPolicy {
            max_attempts: parse_var(&lookup, "NEURADB_MAX_ATTEMPTS", defaults.retry.max_attempts)?,
            base_delay: Duration::from_millis(parse_var(
                &lookup,
                "NEURADB_RETRY_BASE_MS",
                defaults.retry.base_delay.as_millis() as u64,
            )?),
            max_delay: Duration::from_millis(parse_var(
                &lookup,
                "NEURADB_RETRY_MAX_MS",
                defaults.retry.max_delay.as_millis() as u64,
            )?),
            jitter: parse_var(&lookup, "NEURADB_RETRY_JITTER", defaults.retry.jitter)?,
        };

        let config = Self {
            provider,
            api_key: lookup("NEURADB_EMBEDDING_API_KEY").unwrap_or_default(),
            embedding_model: lookup("NEURADB_EMBEDDING_MODEL").filter(|m| !m.is_empty()),
            base_url: lookup("NEURADB_EMBEDDING_BASE_URL").filter(|u| !u.is_empty()),
            default_batch_size: parse_var(&lookup, "NEURADB_BATCH_SIZE", defaults.default_batch_size)?,
            max_concurrency: parse_var(&lookup, "NEURADB_MAX_CONCURRENCY", defaults.max_concurrency)?,
            embed_batch_limit: parse_var(&lookup, "NEURADB_EMBED_BATCH_LIMIT", defaults.embed_batch_limit)?,
            retry,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.default_batch_size == 0 {
            return Err(DomainError::Config("batch size must be greater than 0".into()));
        }
        if self.max_concurrency == 0 {
            return Err(DomainError::Config("max concurrency must be greater than 0".into()));
        }
        if self.embed_batch_limit == 0 {
            return Err(DomainError::Config("embed batch limit must be greater than 0".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(DomainError::Config("max attempts must be greater than 0".into()));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, DomainError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DomainError::Config(format!("{key}: cannot parse {raw:?}"))),
    }
}
