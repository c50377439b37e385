//! Data types that flow through the concierge pipeline.
//!
//! A [`Message`] enters, a [`QueryAnalysis`] and [`RoutingDecision`] are
//! derived from it, each data source answers with a [`DataSourceResponse`],
//! and the merger folds those into one [`OrchestratedResponse`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============ Transcript ============

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One immutable transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Monotonically increasing within a conversation.
    pub id: u64,
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(id: u64, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(id: u64, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Rolling summary of recent user turns, used as a prompt hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationContext {
    pub topic: String,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

// ============ Analysis ============

/// The closed set of query intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    GeneralTravelInfo,
    RealTimeAvailability,
    LocalSponsoredHotels,
    LocationGuide,
    HybridRecommendation,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::GeneralTravelInfo,
        Intent::RealTimeAvailability,
        Intent::LocalSponsoredHotels,
        Intent::LocationGuide,
        Intent::HybridRecommendation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::GeneralTravelInfo => "general_travel_info",
            Intent::RealTimeAvailability => "real_time_availability",
            Intent::LocalSponsoredHotels => "local_sponsored_hotels",
            Intent::LocationGuide => "location_guide",
            Intent::HybridRecommendation => "hybrid_recommendation",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured signals pulled out of a query.
///
/// Sets are ordered so that output is deterministic; `dates` keeps the
/// phrases in vocabulary order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entities {
    pub locations: BTreeSet<String>,
    pub dates: Vec<String>,
    pub amenities: BTreeSet<String>,
    pub hotel_names: BTreeSet<String>,
}

/// Check-in / check-out pair, calendar dates only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl DateRange {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

/// Party size passed to the availability backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guests {
    pub adults: u32,
    pub children: u32,
}

impl Default for Guests {
    fn default() -> Self {
        Self {
            adults: 2,
            children: 0,
        }
    }
}

/// Local content categories served by the content backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Beaches,
    Restaurants,
    Activities,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Beaches => "beaches",
            ContentType::Restaurants => "restaurants",
            ContentType::Activities => "activities",
        }
    }
}

/// Everything the classifier derived from one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnalysis {
    pub intent: Intent,
    /// Always within `[0.0, 1.0]`.
    pub confidence: f64,
    pub requires_real_time: bool,
    pub location_specific: bool,
    pub date_requested: bool,
    pub entities: Entities,
    pub dates: Option<DateRange>,
    pub guests: Guests,
    pub content_type: Option<ContentType>,
}

// ============ Routing ============

/// The four external backends the orchestrator can consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GeneralKnowledge,
    RealTimeHotels,
    LocalHotelDirectory,
    LocalContent,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::GeneralKnowledge,
        SourceKind::RealTimeHotels,
        SourceKind::LocalHotelDirectory,
        SourceKind::LocalContent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::GeneralKnowledge => "general_knowledge",
            SourceKind::RealTimeHotels => "real_time_hotels",
            SourceKind::LocalHotelDirectory => "local_hotel_directory",
            SourceKind::LocalContent => "local_content",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    Single,
    Parallel,
    Sequential,
}

impl ExecutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStrategy::Single => "single",
            ExecutionStrategy::Parallel => "parallel",
            ExecutionStrategy::Sequential => "sequential",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    Prioritize,
    Combine,
    Overlay,
}

/// One step of a routing plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcePlan {
    pub source: SourceKind,
    pub weight: f64,
    pub purpose: &'static str,
}

/// Execution plan for one query. `sources` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub strategy: ExecutionStrategy,
    pub sources: Vec<SourcePlan>,
    pub merging_strategy: MergeStrategy,
}

impl RoutingDecision {
    pub fn weight_of(&self, source: SourceKind) -> f64 {
        self.sources
            .iter()
            .find(|p| p.source == source)
            .map(|p| p.weight)
            .unwrap_or(0.0)
    }
}

// ============ Source payloads ============

/// A hotel card, normalized from whichever backend produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: Option<String>,
    pub name: String,
    pub location: Option<String>,
    /// Canonical nightly price in EUR. Adapters map `daily_rate` and
    /// `price` into this field.
    pub price_per_night: Option<f64>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub sponsored: bool,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub booking_url: Option<String>,
    pub source: SourceKind,
}

/// A beach, restaurant or activity from the local content backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalContentItem {
    pub id: Option<String>,
    pub title: String,
    pub content_type: ContentType,
    pub description: Option<String>,
    pub location: Option<String>,
    pub rating: Option<f64>,
    pub popularity: Option<f64>,
    pub image_url: Option<String>,
}

/// Typed result of one adapter call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum SourcePayload {
    Text(String),
    RealTimeHotels(Vec<Hotel>),
    LocalHotels(Vec<Hotel>),
    LocalContent(Vec<LocalContentItem>),
    Empty,
}

impl SourcePayload {
    pub fn text(&self) -> Option<&str> {
        match self {
            SourcePayload::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn hotels(&self) -> &[Hotel] {
        match self {
            SourcePayload::RealTimeHotels(h) | SourcePayload::LocalHotels(h) => h,
            _ => &[],
        }
    }

    pub fn content(&self) -> &[LocalContentItem] {
        match self {
            SourcePayload::LocalContent(c) => c,
            _ => &[],
        }
    }

    /// Heuristic confidence of a successful payload.
    pub fn confidence(&self) -> f64 {
        match self {
            SourcePayload::Text(t) if !t.trim().is_empty() => 0.8,
            SourcePayload::Text(_) => 0.3,
            SourcePayload::RealTimeHotels(h) | SourcePayload::LocalHotels(h) => {
                if h.is_empty() {
                    0.5
                } else {
                    0.9
                }
            }
            SourcePayload::LocalContent(c) => {
                if c.is_empty() {
                    0.5
                } else {
                    0.85
                }
            }
            SourcePayload::Empty => 0.0,
        }
    }
}

/// Per-source result envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSourceResponse {
    pub source: SourceKind,
    pub data: SourcePayload,
    pub confidence: f64,
    pub execution_time_ms: u64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DataSourceResponse {
    pub fn succeeded(source: SourceKind, data: SourcePayload, execution_time_ms: u64) -> Self {
        let confidence = data.confidence();
        Self {
            source,
            data,
            confidence,
            execution_time_ms,
            success: true,
            error: None,
        }
    }

    pub fn failed(source: SourceKind, error: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            source,
            data: SourcePayload::Empty,
            confidence: 0.0,
            execution_time_ms,
            success: false,
            error: Some(error.into()),
        }
    }
}

// ============ Final reply ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMetadata {
    pub sources_used: Vec<SourceKind>,
    pub confidence: f64,
    pub total_execution_time_ms: u64,
    pub strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// The unit handed back to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestratedResponse {
    pub primary_response: String,
    pub hotels: Vec<Hotel>,
    pub local_content: Vec<LocalContentItem>,
    pub metadata: ResponseMetadata,
}
