//! Response merging.
//!
//! Folds the per-source results of one query into a single
//! [`OrchestratedResponse`]:
//!
//! - **prioritize**: first successful text verbatim.
//! - **combine**: general-knowledge text (or a synthesized sentence) plus a
//!   short summary of what the hotel and content sources found.
//! - **overlay**: general-knowledge text with [`HOTEL_TRIGGER_PHRASE`]
//!   appended when hotels were found and the text does not mention them.
//!
//! Hotels from every source are deduplicated by case-insensitive name or id,
//! first seen wins, and capped at [`MAX_HOTELS`]. Local content is capped at
//! [`MAX_LOCAL_CONTENT`].

use std::collections::HashSet;

use crate::models::{
    DataSourceResponse, ExecutionStrategy, Hotel, LocalContentItem, MergeStrategy,
    OrchestratedResponse, ResponseMetadata, RoutingDecision, SourceKind,
};

pub const MAX_HOTELS: usize = 12;
pub const MAX_LOCAL_CONTENT: usize = 8;

/// Tells the UI to render hotel cards under the text.
pub const HOTEL_TRIGGER_PHRASE: &str = "Here are the available hotels for your dates:";

pub const FALLBACK_MESSAGE: &str = "I'm sorry, I'm having trouble reaching our travel information right now. Please try again in a moment.";

const NOTHING_FOUND_MESSAGE: &str = "I couldn't find anything specific for that request. Could you tell me a little more about what you're looking for on Sifnos?";

/// Merge source responses according to the decision's merging strategy.
pub fn merge_responses(
    responses: &[DataSourceResponse],
    decision: &RoutingDecision,
) -> OrchestratedResponse {
    let total_execution_time_ms = total_time(responses, decision.strategy);
    let successes: Vec<&DataSourceResponse> = responses.iter().filter(|r| r.success).collect();

    if successes.is_empty() {
        return fallback_response(decision.strategy.as_str(), total_execution_time_ms);
    }

    let hotels = dedup_hotels(
        successes.iter().flat_map(|r| r.data.hotels().iter().cloned()),
        MAX_HOTELS,
    );
    let local_content: Vec<LocalContentItem> = successes
        .iter()
        .flat_map(|r| r.data.content().iter().cloned())
        .take(MAX_LOCAL_CONTENT)
        .collect();

    let general_text = successes
        .iter()
        .filter(|r| r.source == SourceKind::GeneralKnowledge)
        .filter_map(|r| r.data.text())
        .map(str::trim)
        .find(|t| !t.is_empty());

    let summary = summary_line(responses, hotels.len(), local_content.len());

    let primary_response = match decision.merging_strategy {
        MergeStrategy::Prioritize => successes
            .iter()
            .filter_map(|r| r.data.text())
            .find(|t| !t.trim().is_empty())
            .map(str::to_string)
            .or_else(|| summary.clone())
            .unwrap_or_else(|| NOTHING_FOUND_MESSAGE.to_string()),
        MergeStrategy::Combine => match (general_text, summary) {
            (Some(text), Some(summary)) => format!("{}\n\n{}", text, summary),
            (Some(text), None) => text.to_string(),
            (None, Some(summary)) => summary,
            (None, None) => NOTHING_FOUND_MESSAGE.to_string(),
        },
        MergeStrategy::Overlay => {
            let base = general_text
                .map(str::to_string)
                .or(summary)
                .unwrap_or_else(|| NOTHING_FOUND_MESSAGE.to_string());
            if !hotels.is_empty() && !references_hotels(&base, &hotels) {
                format!("{}\n\n{}", base, HOTEL_TRIGGER_PHRASE)
            } else {
                base
            }
        }
    };

    OrchestratedResponse {
        primary_response,
        hotels,
        local_content,
        metadata: ResponseMetadata {
            sources_used: successes.iter().map(|r| r.source).collect(),
            confidence: weighted_confidence(&successes, decision),
            total_execution_time_ms,
            strategy: decision.strategy.as_str().to_string(),
            intent: None,
            request_id: None,
        },
    }
}

/// The apology returned when no source produced anything.
pub fn fallback_response(strategy: &str, total_execution_time_ms: u64) -> OrchestratedResponse {
    OrchestratedResponse {
        primary_response: FALLBACK_MESSAGE.to_string(),
        hotels: Vec::new(),
        local_content: Vec::new(),
        metadata: ResponseMetadata {
            sources_used: Vec::new(),
            confidence: 0.0,
            total_execution_time_ms,
            strategy: strategy.to_string(),
            intent: None,
            request_id: None,
        },
    }
}

/// Collapse duplicates by case-insensitive name or by id, keeping first-seen
/// order, and stop at `cap` entries.
pub fn dedup_hotels(hotels: impl IntoIterator<Item = Hotel>, cap: usize) -> Vec<Hotel> {
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for hotel in hotels {
        if out.len() >= cap {
            break;
        }
        let name_key = hotel.name.trim().to_lowercase();
        let id_key = hotel.id.as_deref().map(str::trim).filter(|id| !id.is_empty());

        let dup_name = !name_key.is_empty() && seen_names.contains(&name_key);
        let dup_id = id_key.is_some_and(|id| seen_ids.contains(id));
        if dup_name || dup_id {
            continue;
        }

        if !name_key.is_empty() {
            seen_names.insert(name_key);
        }
        if let Some(id) = id_key {
            seen_ids.insert(id.to_string());
        }
        out.push(hotel);
    }

    out
}

fn references_hotels(text: &str, hotels: &[Hotel]) -> bool {
    let lower = text.to_lowercase();
    lower.contains(&HOTEL_TRIGGER_PHRASE.to_lowercase())
        || hotels.iter().any(|h| {
            let name = h.name.trim().to_lowercase();
            !name.is_empty() && lower.contains(&name)
        })
}

/// One sentence describing what the hotel and content sources produced.
///
/// Distinguishes "searched and found nothing" from "could not search".
fn summary_line(responses: &[DataSourceResponse], hotels: usize, content: usize) -> Option<String> {
    let is_hotel_source = |s: SourceKind| {
        matches!(
            s,
            SourceKind::RealTimeHotels | SourceKind::LocalHotelDirectory
        )
    };
    let hotel_searched = responses
        .iter()
        .any(|r| r.success && is_hotel_source(r.source));
    let hotel_failed = responses
        .iter()
        .any(|r| !r.success && is_hotel_source(r.source));

    let line = match (hotels, content) {
        (0, 0) if hotel_searched => {
            "I couldn't find any hotels matching your request for those dates. Try different dates or another village on the island.".to_string()
        }
        (0, 0) if hotel_failed => {
            "I couldn't reach the hotel booking service just now, but I'm happy to help with anything else about Sifnos.".to_string()
        }
        (0, 0) => return None,
        (h, 0) => format!("I found {} that match your request.", plural(h, "hotel")),
        (0, c) if hotel_searched => format!(
            "I couldn't find any hotels matching your request, but here {} {} on Sifnos.",
            if c == 1 { "is" } else { "are" },
            plural(c, "local recommendation")
        ),
        (0, c) => format!(
            "Here {} {} on Sifnos.",
            if c == 1 { "is" } else { "are" },
            plural(c, "local recommendation")
        ),
        (h, c) => format!(
            "I found {} and {} for you.",
            plural(h, "hotel"),
            plural(c, "local recommendation")
        ),
    };
    Some(line)
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

/// Routing-weighted mean of the successful sources' confidence.
fn weighted_confidence(successes: &[&DataSourceResponse], decision: &RoutingDecision) -> f64 {
    let weights: Vec<f64> = successes
        .iter()
        .map(|r| decision.weight_of(r.source))
        .collect();
    let total_weight: f64 = weights.iter().sum();

    let score = if total_weight > 0.0 {
        successes
            .iter()
            .zip(&weights)
            .map(|(r, w)| r.confidence * w)
            .sum::<f64>()
            / total_weight
    } else {
        successes.iter().map(|r| r.confidence).sum::<f64>() / successes.len() as f64
    };
    score.clamp(0.0, 1.0)
}

fn total_time(responses: &[DataSourceResponse], strategy: ExecutionStrategy) -> u64 {
    let times = responses.iter().map(|r| r.execution_time_ms);
    match strategy {
        ExecutionStrategy::Parallel => times.max().unwrap_or(0),
        ExecutionStrategy::Single | ExecutionStrategy::Sequential => times.sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, Intent, SourcePayload};
    use crate::routing::select_route;

    fn hotel(id: Option<&str>, name: &str, source: SourceKind) -> Hotel {
        Hotel {
            id: id.map(str::to_string),
            name: name.to_string(),
            location: Some("Apollonia".to_string()),
            price_per_night: Some(120.0),
            rating: Some(4.5),
            sponsored: false,
            amenities: Vec::new(),
            photos: Vec::new(),
            booking_url: None,
            source,
        }
    }

    fn content(title: &str) -> LocalContentItem {
        LocalContentItem {
            id: None,
            title: title.to_string(),
            content_type: ContentType::Beaches,
            description: None,
            location: None,
            rating: None,
            popularity: None,
            image_url: None,
        }
    }

    fn ok(source: SourceKind, data: SourcePayload, ms: u64) -> DataSourceResponse {
        DataSourceResponse::succeeded(source, data, ms)
    }

    fn failed(source: SourceKind, ms: u64) -> DataSourceResponse {
        DataSourceResponse::failed(source, "connection refused", ms)
    }

    #[test]
    fn test_dedup_case_insensitive_across_sources() {
        let decision = select_route(Intent::RealTimeAvailability);
        let responses = vec![
            ok(
                SourceKind::RealTimeHotels,
                SourcePayload::RealTimeHotels(vec![hotel(
                    Some("rt-1"),
                    "Villa Olivia Clara",
                    SourceKind::RealTimeHotels,
                )]),
                10,
            ),
            ok(
                SourceKind::LocalHotelDirectory,
                SourcePayload::LocalHotels(vec![hotel(
                    Some("42"),
                    "VILLA OLIVIA CLARA ",
                    SourceKind::LocalHotelDirectory,
                )]),
                12,
            ),
        ];
        let merged = merge_responses(&responses, &decision);
        assert_eq!(merged.hotels.len(), 1);
        assert_eq!(merged.hotels[0].source, SourceKind::RealTimeHotels);
    }

    #[test]
    fn test_dedup_by_id() {
        let hotels = vec![
            hotel(Some("h1"), "Anthousa", SourceKind::LocalHotelDirectory),
            hotel(Some("h1"), "Anthousa Hotel & Suites", SourceKind::RealTimeHotels),
            hotel(None, "Delfini", SourceKind::RealTimeHotels),
            hotel(None, "delfini", SourceKind::RealTimeHotels),
        ];
        let out = dedup_hotels(hotels, MAX_HOTELS);
        let names: Vec<&str> = out.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Anthousa", "Delfini"]);
    }

    #[test]
    fn test_hotel_cap_preserves_order() {
        let decision = select_route(Intent::HybridRecommendation);
        let first: Vec<Hotel> = (0..10)
            .map(|i| hotel(None, &format!("Hotel {}", i), SourceKind::RealTimeHotels))
            .collect();
        let second: Vec<Hotel> = (10..20)
            .map(|i| hotel(None, &format!("Hotel {}", i), SourceKind::LocalHotelDirectory))
            .collect();
        let responses = vec![
            ok(SourceKind::RealTimeHotels, SourcePayload::RealTimeHotels(first), 5),
            ok(SourceKind::LocalHotelDirectory, SourcePayload::LocalHotels(second), 5),
        ];
        let merged = merge_responses(&responses, &decision);
        assert_eq!(merged.hotels.len(), MAX_HOTELS);
        let names: Vec<String> = merged.hotels.iter().map(|h| h.name.clone()).collect();
        let expected: Vec<String> = (0..12).map(|i| format!("Hotel {}", i)).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_content_cap() {
        let decision = select_route(Intent::LocationGuide);
        let items: Vec<LocalContentItem> = (0..11).map(|i| content(&format!("Beach {}", i))).collect();
        let responses = vec![ok(SourceKind::LocalContent, SourcePayload::LocalContent(items), 3)];
        let merged = merge_responses(&responses, &decision);
        assert_eq!(merged.local_content.len(), MAX_LOCAL_CONTENT);
        assert_eq!(merged.local_content[0].title, "Beach 0");
    }

    #[test]
    fn test_all_failed_falls_back() {
        let decision = select_route(Intent::HybridRecommendation);
        let responses: Vec<DataSourceResponse> = decision
            .sources
            .iter()
            .map(|p| failed(p.source, 7))
            .collect();
        let merged = merge_responses(&responses, &decision);
        assert_eq!(merged.primary_response, FALLBACK_MESSAGE);
        assert!(merged.hotels.is_empty());
        assert!(merged.local_content.is_empty());
        assert_eq!(merged.metadata.confidence, 0.0);
        assert!(merged.metadata.sources_used.is_empty());
    }

    #[test]
    fn test_prioritize_uses_text_verbatim() {
        let decision = select_route(Intent::GeneralTravelInfo);
        let text = "  Ferries leave Piraeus daily.  ";
        let responses = vec![ok(
            SourceKind::GeneralKnowledge,
            SourcePayload::Text(text.to_string()),
            40,
        )];
        let merged = merge_responses(&responses, &decision);
        assert_eq!(merged.primary_response, text);
        assert_eq!(merged.metadata.strategy, "single");
        assert_eq!(merged.metadata.total_execution_time_ms, 40);
    }

    #[test]
    fn test_overlay_appends_trigger() {
        let decision = select_route(Intent::LocalSponsoredHotels);
        let responses = vec![
            ok(
                SourceKind::LocalHotelDirectory,
                SourcePayload::LocalHotels(vec![hotel(
                    Some("1"),
                    "Verina Astra",
                    SourceKind::LocalHotelDirectory,
                )]),
                20,
            ),
            ok(
                SourceKind::GeneralKnowledge,
                SourcePayload::Text("Apollonia is the lively capital.".to_string()),
                30,
            ),
        ];
        let merged = merge_responses(&responses, &decision);
        assert_eq!(
            merged.primary_response,
            format!("Apollonia is the lively capital.\n\n{}", HOTEL_TRIGGER_PHRASE)
        );
        assert_eq!(merged.metadata.total_execution_time_ms, 50);
    }

    #[test]
    fn test_overlay_skips_trigger_when_hotels_mentioned() {
        let decision = select_route(Intent::LocalSponsoredHotels);
        let responses = vec![
            ok(
                SourceKind::LocalHotelDirectory,
                SourcePayload::LocalHotels(vec![hotel(
                    Some("1"),
                    "Verina Astra",
                    SourceKind::LocalHotelDirectory,
                )]),
                20,
            ),
            ok(
                SourceKind::GeneralKnowledge,
                SourcePayload::Text("Verina Astra overlooks the Aegean.".to_string()),
                30,
            ),
        ];
        let merged = merge_responses(&responses, &decision);
        assert_eq!(merged.primary_response, "Verina Astra overlooks the Aegean.");
    }

    #[test]
    fn test_overlay_without_hotels_leaves_text() {
        let decision = select_route(Intent::LocationGuide);
        let responses = vec![
            ok(SourceKind::LocalContent, SourcePayload::LocalContent(vec![content("Vathi")]), 5),
            ok(
                SourceKind::GeneralKnowledge,
                SourcePayload::Text("Vathi is a sheltered bay.".to_string()),
                5,
            ),
        ];
        let merged = merge_responses(&responses, &decision);
        assert_eq!(merged.primary_response, "Vathi is a sheltered bay.");
        assert_eq!(merged.local_content.len(), 1);
    }

    #[test]
    fn test_combine_synthesizes_summary() {
        let decision = select_route(Intent::RealTimeAvailability);
        let responses = vec![
            ok(
                SourceKind::RealTimeHotels,
                SourcePayload::RealTimeHotels(vec![
                    hotel(None, "A", SourceKind::RealTimeHotels),
                    hotel(None, "B", SourceKind::RealTimeHotels),
                ]),
                100,
            ),
            failed(SourceKind::LocalHotelDirectory, 250),
        ];
        let merged = merge_responses(&responses, &decision);
        assert_eq!(merged.primary_response, "I found 2 hotels that match your request.");
        assert_eq!(merged.metadata.sources_used, vec![SourceKind::RealTimeHotels]);
        assert_eq!(merged.metadata.total_execution_time_ms, 250);
    }

    #[test]
    fn test_combine_prefers_general_text() {
        let decision = select_route(Intent::HybridRecommendation);
        let responses = vec![
            ok(
                SourceKind::RealTimeHotels,
                SourcePayload::RealTimeHotels(vec![hotel(None, "A", SourceKind::RealTimeHotels)]),
                1,
            ),
            ok(SourceKind::LocalHotelDirectory, SourcePayload::LocalHotels(vec![]), 1),
            ok(SourceKind::LocalContent, SourcePayload::LocalContent(vec![content("Chrysopigi")]), 1),
            ok(
                SourceKind::GeneralKnowledge,
                SourcePayload::Text("Spend three days walking between villages.".to_string()),
                1,
            ),
        ];
        let merged = merge_responses(&responses, &decision);
        assert_eq!(
            merged.primary_response,
            "Spend three days walking between villages.\n\nI found 1 hotel and 1 local recommendation for you."
        );
    }

    #[test]
    fn test_empty_hotels_differs_from_failed_hotels() {
        let decision = select_route(Intent::RealTimeAvailability);
        let empty = vec![
            ok(SourceKind::RealTimeHotels, SourcePayload::RealTimeHotels(vec![]), 1),
            failed(SourceKind::LocalHotelDirectory, 1),
        ];
        let merged_empty = merge_responses(&empty, &decision);
        assert!(merged_empty.primary_response.contains("couldn't find any hotels"));

        let decision = select_route(Intent::HybridRecommendation);
        let unreachable = vec![
            failed(SourceKind::RealTimeHotels, 1),
            failed(SourceKind::LocalHotelDirectory, 1),
            failed(SourceKind::LocalContent, 1),
            ok(SourceKind::GeneralKnowledge, SourcePayload::Text(String::new()), 1),
        ];
        let merged_failed = merge_responses(&unreachable, &decision);
        assert!(merged_failed.primary_response.contains("couldn't reach"));
        assert_ne!(merged_empty.primary_response, merged_failed.primary_response);
    }

    #[test]
    fn test_empty_hotels_still_reported_beside_content() {
        let decision = select_route(Intent::HybridRecommendation);
        let responses = vec![
            ok(SourceKind::RealTimeHotels, SourcePayload::RealTimeHotels(vec![]), 1),
            ok(SourceKind::LocalHotelDirectory, SourcePayload::LocalHotels(vec![]), 1),
            ok(
                SourceKind::LocalContent,
                SourcePayload::LocalContent(vec![content("Chrysopigi"), content("Vathi")]),
                1,
            ),
            failed(SourceKind::GeneralKnowledge, 1),
        ];
        let merged = merge_responses(&responses, &decision);
        assert!(merged.hotels.is_empty());
        assert_eq!(merged.local_content.len(), 2);
        assert_eq!(
            merged.primary_response,
            "I couldn't find any hotels matching your request, but here are 2 local recommendations on Sifnos."
        );

        let content_only = vec![ok(
            SourceKind::LocalContent,
            SourcePayload::LocalContent(vec![content("Chrysopigi")]),
            1,
        )];
        let merged = merge_responses(&content_only, &select_route(Intent::LocationGuide));
        assert_eq!(merged.primary_response, "Here is 1 local recommendation on Sifnos.");
    }

    #[test]
    fn test_weighted_confidence() {
        let decision = select_route(Intent::RealTimeAvailability);
        let responses = vec![
            ok(
                SourceKind::RealTimeHotels,
                SourcePayload::RealTimeHotels(vec![hotel(None, "A", SourceKind::RealTimeHotels)]),
                1,
            ),
            ok(SourceKind::LocalHotelDirectory, SourcePayload::LocalHotels(vec![]), 1),
        ];
        let merged = merge_responses(&responses, &decision);
        // (0.9 * 0.7 + 0.5 * 0.3) / 1.0
        assert!((merged.metadata.confidence - 0.78).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&merged.metadata.confidence));
    }
}
