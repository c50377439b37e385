//! Local hotel directory (PostgREST).
//!
//! Hotels are read with their amenity and photo rows embedded:
//!
//! ```text
//! GET {url}/rest/v1/hotels?select=*,hotel_amenities(*),hotel_photos(*)
//!     &location=ilike.*kamares*&order=is_sponsored.desc,rating.desc
//! ```
//!
//! The result is re-sorted locally so sponsored listings lead regardless of
//! how the backend applied `order`.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use concierge_core::models::{Hotel, SourceKind, SourcePayload};
use concierge_core::source::{DataSource, SourceRequest};

use super::{desc, http_client, id_string, send_with_retry};
use crate::config::HttpSourceConfig;

const SELECT: &str = "*,hotel_amenities(*),hotel_photos(*)";
const ORDER: &str = "is_sponsored.desc,rating.desc";

pub struct HotelDirectorySource {
    client: reqwest::Client,
    config: HttpSourceConfig,
    api_key: Option<String>,
}

/// A `hotels` row. Older schemas spell some columns differently and a view
/// may expose both spellings, so each is read separately.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DirectoryRow {
    id: Option<Value>,
    name: Option<String>,
    location: Option<String>,
    price_per_night: Option<f64>,
    daily_rate: Option<f64>,
    price: Option<f64>,
    rating: Option<f64>,
    is_sponsored: Option<bool>,
    hotel_amenities: Option<Vec<AmenityRow>>,
    hotel_photos: Option<Vec<PhotoRow>>,
    booking_url: Option<String>,
    website: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AmenityRow {
    name: Option<String>,
    amenity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PhotoRow {
    url: Option<String>,
    photo_url: Option<String>,
}

impl DirectoryRow {
    fn into_hotel(self) -> Option<Hotel> {
        let name = self.name?.trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(Hotel {
            id: id_string(self.id),
            name,
            location: self.location,
            price_per_night: self.price_per_night.or(self.daily_rate).or(self.price),
            rating: self.rating,
            sponsored: self.is_sponsored.unwrap_or(false),
            amenities: self
                .hotel_amenities
                .unwrap_or_default()
                .into_iter()
                .filter_map(|a| a.name.or(a.amenity))
                .collect(),
            photos: self
                .hotel_photos
                .unwrap_or_default()
                .into_iter()
                .filter_map(|p| p.url.or(p.photo_url))
                .collect(),
            booking_url: self.booking_url.or(self.website),
            source: SourceKind::LocalHotelDirectory,
        })
    }
}

/// Decode rows and order them sponsored first, then by rating.
pub(crate) fn parse_rows(body: Value) -> Result<Vec<Hotel>> {
    let rows: Vec<DirectoryRow> = serde_json::from_value(body)?;
    let mut hotels: Vec<Hotel> = rows.into_iter().filter_map(DirectoryRow::into_hotel).collect();
    hotels.sort_by(|a, b| {
        b.sponsored
            .cmp(&a.sponsored)
            .then_with(|| desc(a.rating, b.rating))
    });
    Ok(hotels)
}

/// PostgREST query pairs for a request.
pub(crate) fn query_params(request: &SourceRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", SELECT.to_string())];
    let location = request
        .analysis
        .entities
        .locations
        .iter()
        .find(|l| l.as_str() != "sifnos");
    if let Some(location) = location {
        params.push(("location", format!("ilike.*{}*", location)));
    }
    params.push(("order", ORDER.to_string()));
    params
}

impl HotelDirectorySource {
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
impl DataSource for HotelDirectorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::LocalHotelDirectory
    }

    fn description(&self) -> &str {
        "Partner and sponsored hotels from the local directory"
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourcePayload> {
        let url = format!("{}/rest/v1/hotels", self.config.url.trim_end_matches('/'));
        let params = query_params(request);

        let response = send_with_retry("hotel directory", self.config.max_retries, || {
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
        Ok(SourcePayload::LocalHotels(parse_rows(body)?))
    }
}
