//! Local content (beaches, restaurants, activities) from PostgREST.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use concierge_core::models::{ContentType, LocalContentItem, SourceKind, SourcePayload};
use concierge_core::source::{DataSource, SourceRequest};

use super::{desc, http_client, id_string, send_with_retry};
use crate::config::HttpSourceConfig;

const ORDER: &str = "popularity.desc,rating.desc";

pub struct LocalContentSource {
    client: reqwest::Client,
    config: HttpSourceConfig,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentRow {
    id: Option<Value>,
    title: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
    location: Option<String>,
    rating: Option<f64>,
    popularity: Option<f64>,
    image_url: Option<String>,
    image: Option<String>,
}

/// Backends label rows singular or plural.
fn content_type(label: &str) -> Option<ContentType> {
    match label.trim().to_lowercase().as_str() {
        "beach" | "beaches" => Some(ContentType::Beaches),
        "restaurant" | "restaurants" => Some(ContentType::Restaurants),
        "activity" | "activities" => Some(ContentType::Activities),
        _ => None,
    }
}

/// Decode rows, dropping those of unknown type, most popular first.
pub(crate) fn parse_rows(body: Value, requested: Option<ContentType>) -> Result<Vec<LocalContentItem>> {
    let rows: Vec<ContentRow> = serde_json::from_value(body)?;
    let mut items: Vec<LocalContentItem> = rows
        .into_iter()
        .filter_map(|r| {
            let title = [r.title, r.name]
                .into_iter()
                .flatten()
                .map(|t| t.trim().to_string())
                .find(|t| !t.is_empty())?;
            let content_type = r.kind.as_deref().and_then(content_type).or(requested)?;
            Some(LocalContentItem {
                id: id_string(r.id),
                title,
                content_type,
                description: r.description,
                location: r.location,
                rating: r.rating,
                popularity: r.popularity,
                image_url: r.image_url.or(r.image),
            })
        })
        .collect();
    items.sort_by(|a, b| desc(a.popularity, b.popularity).then_with(|| desc(a.rating, b.rating)));
    Ok(items)
}

pub(crate) fn query_params(content_type: Option<ContentType>) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", "*".to_string())];
    if let Some(ct) = content_type {
        params.push(("type", format!("eq.{}", ct.as_str())));
    }
    params.push(("order", ORDER.to_string()));
    params
}

impl LocalContentSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            config,
            api_key,
        })
    }
}

#[async_trait]
impl DataSource for LocalContentSource {
    fn kind(&self) -> SourceKind {
        SourceKind::LocalContent
    }

    fn description(&self) -> &str {
        "Beaches, restaurants and activities curated for the island"
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourcePayload> {
        let requested = request.analysis.content_type;
        let url = format!("{}/rest/v1/local_content", self.config.url.trim_end_matches('/'));
        let params = query_params(requested);

        let response = send_with_retry("local content", self.config.max_retries, || {
            let builder = self.client.get(&url).query(&params);
            match &self.api_key {
                Some(key) => builder
                    .header("apikey", key)
                    .header("Authorization", format!("Bearer {}", key)),
                None => builder,
            }
        })
        .await?;

        let body: Value = response.json().await?;
        Ok(SourcePayload::LocalContent(parse_rows(body, requested)?))
    }
}
