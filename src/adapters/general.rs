//! General travel knowledge from an OpenAI-compatible chat endpoint.
//!
//! The answer is requested with `stream: true` and read token by token: a
//! spawned task decodes the SSE body into [`StreamEvent`]s on a channel, and
//! [`fetch`](DataSource::fetch) folds the channel into the final text.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use concierge_core::models::{Role, SourceKind, SourcePayload};
use concierge_core::source::{DataSource, SourceRequest};

use super::{send_with_retry, streaming_client};
use crate::config::GeneralKnowledgeConfig;
use crate::stream::{collect_text, SseDecoder, StreamEvent};

/// Transcript turns replayed to the model, newest last.
const HISTORY_TURNS: usize = 10;

const CONCIERGE_PROMPT: &str = "You are the travel concierge of a hotel website for Sifnos, \
an island in the Cyclades, Greece. Answer questions about the island warmly and concisely: \
villages such as Apollonia, Artemonas, Kastro and Kamares, beaches, food, pottery, walking \
trails, ferries and the best time to visit. Never invent hotel availability or prices; when \
results from our hotel systems are listed below, refer to those hotels by name.";

pub struct GeneralKnowledgeSource {
    client: reqwest::Client,
    config: GeneralKnowledgeConfig,
    api_key: String,
}

impl GeneralKnowledgeSource {
    pub fn new(config: GeneralKnowledgeConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .with_context(|| format!("{} environment variable not set", config.api_key_env))?;
        Ok(Self {
            client: streaming_client(config.timeout_secs)?,
            config,
            api_key,
        })
    }

    fn body(&self, request: &SourceRequest) -> Value {
        json!({
            "model": self.config.model,
            "messages": chat_messages(request),
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "stream": true,
        })
    }

    /// Open the completion stream. Retries cover the initial request only;
    /// once tokens flow, a broken body surfaces as [`StreamEvent::Failed`].
    pub async fn stream(&self, request: &SourceRequest) -> Result<mpsc::Receiver<StreamEvent>> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = self.body(request);

        let response = send_with_retry("general knowledge", self.config.max_retries, || {
            self.client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
        })
        .await?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let mut decoder = SseDecoder::new();
            let mut bytes = response.bytes_stream();
            while let Some(chunk) = bytes.next().await {
                let events = match chunk {
                    Ok(chunk) => decoder.push(&chunk),
                    Err(e) => vec![StreamEvent::Failed(format!("stream read error: {}", e))],
                };
                for event in events {
                    let last = !matches!(event, StreamEvent::Token(_));
                    if tx.send(event).await.is_err() || last {
                        return;
                    }
                }
            }
            if let Some(event) = decoder.finish() {
                let _ = tx.send(event).await;
            }
        });

        Ok(rx)
    }
}

#[async_trait]
impl DataSource for GeneralKnowledgeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::GeneralKnowledge
    }

    fn description(&self) -> &str {
        "Streamed travel answers from the language model"
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourcePayload> {
        let rx = self.stream(request).await?;
        let text = collect_text(rx).await?;
        Ok(SourcePayload::Text(text.trim().to_string()))
    }
}

/// System prompt plus the recent transcript, ending with the current query.
pub(crate) fn chat_messages(request: &SourceRequest) -> Vec<Value> {
    let mut messages = vec![json!({ "role": "system", "content": system_prompt(request) })];

    let start = request.messages.len().saturating_sub(HISTORY_TURNS);
    for message in &request.messages[start..] {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        messages.push(json!({ "role": role, "content": message.content }));
    }

    let ends_with_query = request
        .messages
        .last()
        .is_some_and(|m| m.role == Role::User && m.content == request.query);
    if !ends_with_query {
        messages.push(json!({ "role": "user", "content": request.query }));
    }

    messages
}

pub(crate) fn system_prompt(request: &SourceRequest) -> String {
    let analysis = &request.analysis;
    let mut prompt = String::from(CONCIERGE_PROMPT);

    if let Some(dates) = &analysis.dates {
        prompt.push_str(&format!(
            "\n\nThe guest is asking about {} to {} ({} nights), {} adults and {} children.",
            dates.check_in.format("%A %-d %B %Y"),
            dates.check_out.format("%A %-d %B %Y"),
            dates.nights(),
            analysis.guests.adults,
            analysis.guests.children,
        ));
    }

    if !analysis.entities.locations.is_empty() {
        let places: Vec<&str> = analysis.entities.locations.iter().map(String::as_str).collect();
        prompt.push_str(&format!("\nPlaces mentioned: {}.", places.join(", ")));
    }

    if let Some(context) = &request.context {
        prompt.push_str(&format!(
            "\nConversation topic: {}. Recent questions: {}",
            context.topic, context.summary
        ));
    }

    if !request.findings.is_empty() {
        prompt.push_str("\n\nResults from our hotel systems:");
        for finding in &request.findings {
            prompt.push_str("\n- ");
            prompt.push_str(finding);
        }
    }

    prompt
}
