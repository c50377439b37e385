//! Live hotel availability.
//!
//! `POST {url}` with the resolved stay and party; the backend answers with
//! `{"hotels": [...]}` (or a bare array). Field names vary between upstream
//! providers, so the wire record accepts the common spellings and is
//! normalized into [`Hotel`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use concierge_core::models::{Hotel, SourceKind, SourcePayload};
use concierge_core::source::{DataSource, SourceRequest};

use super::{http_client, id_string, send_with_retry};
use crate::config::HttpSourceConfig;

pub struct RealTimeHotelSource {
    client: reqwest::Client,
    config: HttpSourceConfig,
    api_key: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct AvailabilityQuery {
    pub location: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub adults: u32,
    pub children: u32,
    pub amenities: Vec<String>,
}

impl AvailabilityQuery {
    pub(crate) fn from_request(request: &SourceRequest) -> Self {
        let analysis = &request.analysis;
        let location = analysis
            .entities
            .locations
            .iter()
            .find(|l| l.as_str() != "sifnos")
            .or_else(|| analysis.entities.locations.iter().next())
            .cloned();
        Self {
            location,
            check_in: analysis.dates.map(|d| d.check_in.to_string()),
            check_out: analysis.dates.map(|d| d.check_out.to_string()),
            adults: analysis.guests.adults,
            children: analysis.guests.children,
            amenities: analysis.entities.amenities.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AvailabilityReply {
    Wrapped { hotels: Vec<AvailableHotel> },
    Bare(Vec<AvailableHotel>),
}

/// One upstream record. Providers disagree on field names and some send
/// more than one spelling per record, so every spelling is its own field and
/// the first one present wins.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AvailableHotel {
    id: Option<Value>,
    hotel_id: Option<Value>,
    name: Option<String>,
    hotel_name: Option<String>,
    location: Option<String>,
    area: Option<String>,
    city: Option<String>,
    price_per_night: Option<f64>,
    daily_rate: Option<f64>,
    price: Option<f64>,
    rating: Option<f64>,
    review_score: Option<f64>,
    amenities: Option<Vec<String>>,
    photos: Option<Vec<String>>,
    images: Option<Vec<String>>,
    booking_url: Option<String>,
    url: Option<String>,
    link: Option<String>,
}

impl AvailableHotel {
    /// Records without a usable name are dropped.
    fn into_hotel(self) -> Option<Hotel> {
        let name = [self.name, self.hotel_name]
            .into_iter()
            .flatten()
            .map(|n| n.trim().to_string())
            .find(|n| !n.is_empty())?;
        Some(Hotel {
            id: id_string(self.id.or(self.hotel_id)),
            name,
            location: self.location.or(self.area).or(self.city),
            price_per_night: self.price_per_night.or(self.daily_rate).or(self.price),
            rating: self.rating.or(self.review_score),
            sponsored: false,
            amenities: self.amenities.unwrap_or_default(),
            photos: self.photos.or(self.images).unwrap_or_default(),
            booking_url: self.booking_url.or(self.url).or(self.link),
            source: SourceKind::RealTimeHotels,
        })
    }
}

pub(crate) fn parse_reply(body: Value) -> Result<Vec<Hotel>> {
    let reply: AvailabilityReply =
        serde_json::from_value(body).context("unexpected availability response shape")?;
    let hotels = match reply {
        AvailabilityReply::Wrapped { hotels } | AvailabilityReply::Bare(hotels) => hotels,
    };
    Ok(hotels.into_iter().filter_map(AvailableHotel::into_hotel).collect())
}

impl RealTimeHotelSource {
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
impl DataSource for RealTimeHotelSource {
    fn kind(&self) -> SourceKind {
        SourceKind::RealTimeHotels
    }

    fn description(&self) -> &str {
        "Live availability and nightly rates for the requested dates"
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourcePayload> {
        let query = AvailabilityQuery::from_request(request);
        tracing::debug!(?query, "querying live availability");

        let response = send_with_retry("real-time hotels", self.config.max_retries, || {
            let builder = self.client.post(&self.config.url).json(&query);
            match &self.api_key {
                Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
                None => builder,
            }
        })
        .await?;

        let body: Value = response.json().await?;
        Ok(SourcePayload::RealTimeHotels(parse_reply(body)?))
    }
}
