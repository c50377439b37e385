//! Data source abstraction.
//!
//! The [`DataSource`] trait is the seam between the orchestration logic and
//! the four external backends. Implementations live in the application
//! crate (HTTP adapters) or in tests (in-memory fakes).

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    ConversationContext, DataSourceResponse, Message, QueryAnalysis, SourceKind, SourcePayload,
};
use crate::vocabulary::{self, normalize};

/// Everything an adapter may need to answer one query.
#[derive(Debug, Clone)]
pub struct SourceRequest {
    /// The latest user message text.
    pub query: String,
    pub analysis: QueryAnalysis,
    /// Full transcript, oldest first.
    pub messages: Vec<Message>,
    pub context: Option<ConversationContext>,
    /// Findings from earlier sequential steps, one line each.
    pub findings: Vec<String>,
}

impl SourceRequest {
    pub fn new(
        query: impl Into<String>,
        analysis: QueryAnalysis,
        messages: Vec<Message>,
        context: Option<ConversationContext>,
    ) -> Self {
        Self {
            query: query.into(),
            analysis,
            messages,
            context,
            findings: Vec::new(),
        }
    }

    /// Request for the next sequential step, sharpened by a completed one.
    ///
    /// Hotel locations fill in the analysis' locations when the user named
    /// none, and found hotels or content become findings for later prompts.
    /// Failed responses leave the request unchanged.
    pub fn enriched_with(&self, response: &DataSourceResponse) -> Self {
        let mut next = self.clone();
        if !response.success {
            return next;
        }

        let hotels = response.data.hotels();
        if !hotels.is_empty() {
            if next.analysis.entities.locations.is_empty() {
                for hotel in hotels {
                    let Some(location) = hotel.location.as_deref() else {
                        continue;
                    };
                    let normalized = normalize(location);
                    for place in vocabulary::matches(&normalized, vocabulary::LOCATIONS) {
                        next.analysis.entities.locations.insert(place.to_string());
                    }
                }
                next.analysis.location_specific = !next.analysis.entities.locations.is_empty();
            }

            let listed: Vec<String> = hotels
                .iter()
                .take(5)
                .map(|h| match (&h.location, h.price_per_night) {
                    (Some(loc), Some(price)) => format!("{} ({}, from €{:.0}/night)", h.name, loc, price),
                    (Some(loc), None) => format!("{} ({})", h.name, loc),
                    (None, Some(price)) => format!("{} (from €{:.0}/night)", h.name, price),
                    (None, None) => h.name.clone(),
                })
                .collect();
            let label = match response.data {
                SourcePayload::RealTimeHotels(_) => "Hotels with live availability",
                _ => "Featured local hotels",
            };
            next.findings.push(format!("{}: {}", label, listed.join("; ")));
        }

        let content = response.data.content();
        if !content.is_empty() {
            let titles: Vec<&str> = content.iter().take(5).map(|c| c.title.as_str()).collect();
            next.findings
                .push(format!("Local highlights: {}", titles.join("; ")));
        }

        next
    }
}

/// An external backend the orchestrator can consult.
///
/// # Example
///
/// ```rust
/// use anyhow::Result;
/// use async_trait::async_trait;
/// use concierge_core::models::{SourceKind, SourcePayload};
/// use concierge_core::source::{DataSource, SourceRequest};
///
/// struct CannedAnswer;
///
/// #[async_trait]
/// impl DataSource for CannedAnswer {
///     fn kind(&self) -> SourceKind { SourceKind::GeneralKnowledge }
///     fn description(&self) -> &str { "Always says hello" }
///
///     async fn fetch(&self, _request: &SourceRequest) -> Result<SourcePayload> {
///         Ok(SourcePayload::Text("Kalimera!".to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Which of the four backends this adapter answers for.
    fn kind(&self) -> SourceKind;

    /// One-line description for `concierge sources`.
    fn description(&self) -> &str;

    /// Query the backend. Errors are converted into failed responses by the
    /// orchestrator and never reach the user directly.
    async fn fetch(&self, request: &SourceRequest) -> Result<SourcePayload>;
}
