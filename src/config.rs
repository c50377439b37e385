use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use concierge_core::models::SourceKind;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound on any single source call; a timeout counts as a failure.
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,
    /// Number of recent user messages folded into the conversation context.
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: 20,
            context_window: 5,
        }
    }
}

fn default_source_timeout_secs() -> u64 {
    20
}
fn default_context_window() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourcesConfig {
    pub general_knowledge: Option<GeneralKnowledgeConfig>,
    pub real_time_hotels: Option<HttpSourceConfig>,
    pub directory: Option<HttpSourceConfig>,
    pub local_content: Option<HttpSourceConfig>,
}

impl SourcesConfig {
    pub fn is_configured(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::GeneralKnowledge => self.general_knowledge.is_some(),
            SourceKind::RealTimeHotels => self.real_time_hotels.is_some(),
            SourceKind::LocalHotelDirectory => self.directory.is_some(),
            SourceKind::LocalContent => self.local_content.is_some(),
        }
    }
}

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct GeneralKnowledgeConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Connect timeout and longest silence between streamed chunks. The
    /// whole stream is bounded by `orchestrator.source_timeout_secs`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_llm_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    800
}

/// A JSON-over-HTTP backend (hotel availability, directory, content).
#[derive(Debug, Deserialize, Clone)]
pub struct HttpSourceConfig {
    pub url: String,
    /// Environment variable holding the API key; omitted means no auth.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl HttpSourceConfig {
    /// Resolve the API key from the environment, if one is configured.
    pub fn api_key(&self) -> Result<Option<String>> {
        match &self.api_key_env {
            Some(var) => std::env::var(var)
                .map(Some)
                .with_context(|| format!("{} environment variable not set", var)),
            None => Ok(None),
        }
    }
}

fn default_max_retries() -> u32 {
    2
}
fn default_timeout_secs() -> u64 {
    15
}

impl Config {
    /// Config with no sources, used by offline commands when no file exists.
    pub fn minimal() -> Self {
        Self {
            server: ServerConfig {
                bind: "127.0.0.1:7340".to_string(),
            },
            orchestrator: OrchestratorConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.orchestrator.source_timeout_secs == 0 {
        anyhow::bail!("orchestrator.source_timeout_secs must be > 0");
    }
    if config.orchestrator.context_window == 0 {
        anyhow::bail!("orchestrator.context_window must be >= 1");
    }

    if let Some(gk) = &config.sources.general_knowledge {
        if gk.model.trim().is_empty() {
            anyhow::bail!("sources.general_knowledge.model must not be empty");
        }
        if !(0.0..=2.0).contains(&gk.temperature) {
            anyhow::bail!("sources.general_knowledge.temperature must be in [0.0, 2.0]");
        }
        check_url("sources.general_knowledge.base_url", &gk.base_url)?;
    }

    let http_sources = [
        ("sources.real_time_hotels", &config.sources.real_time_hotels),
        ("sources.directory", &config.sources.directory),
        ("sources.local_content", &config.sources.local_content),
    ];
    for (name, source) in http_sources {
        if let Some(src) = source {
            check_url(&format!("{}.url", name), &src.url)?;
        }
    }

    Ok(())
}

fn check_url(field: &str, url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!("{} must be an http(s) URL, got '{}'", field, url);
    }
    Ok(())
}
