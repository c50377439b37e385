//! HTTP adapters for the four concierge data sources.
//!
//! Each adapter implements [`DataSource`] and normalizes its backend's JSON
//! into the typed payloads of [`concierge_core::models`]. They share the
//! retry policy of [`send_with_retry`]:
//! - HTTP 429 and 5xx → retry with exponential backoff (1s, 2s, 4s, … capped at 32s)
//! - other HTTP 4xx → fail immediately
//! - network errors → retry

pub mod content;
pub mod directory;
pub mod general;
pub mod realtime;

use anyhow::{bail, Result};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use concierge_core::models::SourceKind;
use concierge_core::source::DataSource;

use crate::config::Config;

pub use content::LocalContentSource;
pub use directory::HotelDirectorySource;
pub use general::GeneralKnowledgeSource;
pub use realtime::RealTimeHotelSource;

/// The set of adapters available to the orchestrator, at most one per
/// [`SourceKind`]. Registering a second adapter for a kind replaces the first.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn DataSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for every source configured in the TOML file.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        let sources = &config.sources;

        if let Some(cfg) = &sources.general_knowledge {
            registry.register(Arc::new(GeneralKnowledgeSource::new(cfg.clone())?));
        }
        if let Some(cfg) = &sources.real_time_hotels {
            registry.register(Arc::new(RealTimeHotelSource::new(cfg.clone())?));
        }
        if let Some(cfg) = &sources.directory {
            registry.register(Arc::new(HotelDirectorySource::new(cfg.clone())?));
        }
        if let Some(cfg) = &sources.local_content {
            registry.register(Arc::new(LocalContentSource::new(cfg.clone())?));
        }

        Ok(registry)
    }

    pub fn register(&mut self, source: Arc<dyn DataSource>) {
        let kind = source.kind();
        self.sources.retain(|s| s.kind() != kind);
        self.sources.push(source);
    }

    pub fn get(&self, kind: SourceKind) -> Option<Arc<dyn DataSource>> {
        self.sources.iter().find(|s| s.kind() == kind).cloned()
    }

    pub fn sources(&self) -> &[Arc<dyn DataSource>] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Client for token streams: no bound on the whole response, only on
/// connecting and on the gap between chunks. The orchestrator's per-source
/// timeout still caps the call as a whole.
pub(crate) fn streaming_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(timeout_secs))
        .read_timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Send a request built by `make`, retrying transient failures.
pub(crate) async fn send_with_retry<F>(
    label: &str,
    max_retries: u32,
    make: F,
) -> Result<reqwest::Response>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tracing::debug!(source = label, attempt, ?delay, "retrying");
            tokio::time::sleep(delay).await;
        }

        match make().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                let body_text = response.text().await.unwrap_or_default();
                if status.as_u16() == 429 || status.is_server_error() {
                    last_err = Some(anyhow::anyhow!("{} error {}: {}", label, status, body_text));
                    continue;
                }

                bail!("{} error {}: {}", label, status, body_text);
            }
            Err(e) => {
                last_err = Some(anyhow::anyhow!("{} connection error: {}", label, e));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("{} failed after retries", label)))
}

/// Backend ids arrive as strings or numbers.
pub(crate) fn id_string(id: Option<Value>) -> Option<String> {
    match id? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Descending order for optional scores, missing values last.
pub(crate) fn desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.unwrap_or(f64::NEG_INFINITY);
    let b = b.unwrap_or(f64::NEG_INFINITY);
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
