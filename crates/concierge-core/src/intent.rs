//! Intent classification.
//!
//! Decision order, first match wins:
//!
//! 1. availability/booking phrasing or any date phrase → real-time availability
//! 2. planning keywords, or hotel and local-content keywords together → hybrid
//! 3. a known place plus a hotel keyword, or a named property → local hotels
//! 4. local-content keywords → location guide
//! 5. anything else → general travel info
//!
//! Hybrid is checked before the local-hotel and guide rules so that planning
//! language wins even when a specific property is named.

use chrono::NaiveDate;

use crate::dates;
use crate::entities::{content_type_from_normalized, extract_from_normalized, extract_guests};
use crate::models::{Entities, Intent, QueryAnalysis};
use crate::vocabulary::{self, normalize};

pub const BASE_CONFIDENCE: f64 = 0.5;

/// Keyword families observed in one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub availability: bool,
    pub temporal: bool,
    pub hotel: bool,
    pub beach: bool,
    pub food: bool,
    pub activity: bool,
    pub planning: bool,
    pub location: bool,
    pub named_hotel: bool,
    pub amenity: bool,
}

impl Signals {
    fn detect(normalized: &str, entities: &Entities) -> Self {
        Self {
            availability: vocabulary::any_match(normalized, vocabulary::REAL_TIME_KEYWORDS),
            temporal: !entities.dates.is_empty(),
            hotel: vocabulary::any_match(normalized, vocabulary::HOTEL_KEYWORDS),
            beach: vocabulary::any_match(normalized, vocabulary::BEACH_KEYWORDS),
            food: vocabulary::any_match(normalized, vocabulary::FOOD_KEYWORDS),
            activity: vocabulary::any_match(normalized, vocabulary::ACTIVITY_KEYWORDS),
            planning: vocabulary::any_match(normalized, vocabulary::PLANNING_KEYWORDS),
            location: !entities.locations.is_empty(),
            named_hotel: !entities.hotel_names.is_empty(),
            amenity: !entities.amenities.is_empty(),
        }
    }

    pub fn content(&self) -> bool {
        self.beach || self.food || self.activity
    }

    fn content_families(&self) -> usize {
        [self.beach, self.food, self.activity]
            .iter()
            .filter(|f| **f)
            .count()
    }
}

/// Classify `text` given its already-extracted entities.
pub fn classify(text: &str, entities: &Entities) -> (Intent, f64) {
    let signals = Signals::detect(&normalize(text), entities);
    classify_signals(&signals)
}

pub fn classify_signals(s: &Signals) -> (Intent, f64) {
    if s.availability || s.temporal {
        let confidence = boosted(&[
            (s.availability, 0.2),
            (s.temporal, 0.15),
            (s.hotel || s.named_hotel, 0.1),
            (s.location, 0.05),
        ]);
        return (Intent::RealTimeAvailability, confidence);
    }

    if s.planning || (s.hotel && s.content()) {
        let confidence = boosted(&[
            (s.planning, 0.15),
            (s.hotel || s.named_hotel, 0.1),
            (s.content(), 0.1),
            (s.location, 0.05),
        ]);
        return (Intent::HybridRecommendation, confidence);
    }

    if (s.location && s.hotel) || s.named_hotel {
        let confidence = boosted(&[
            (s.named_hotel, 0.25),
            (s.location && s.hotel, 0.15),
            (s.amenity, 0.05),
        ]);
        return (Intent::LocalSponsoredHotels, confidence);
    }

    if s.content() {
        let confidence = boosted(&[
            (true, 0.15),
            (s.location, 0.15),
            (s.content_families() > 1, 0.05),
        ]);
        return (Intent::LocationGuide, confidence);
    }

    (Intent::GeneralTravelInfo, BASE_CONFIDENCE)
}

fn boosted(boosts: &[(bool, f64)]) -> f64 {
    let total: f64 = boosts
        .iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, inc)| inc)
        .sum();
    (BASE_CONFIDENCE + total).clamp(0.0, 1.0)
}

/// Run extraction, date resolution and classification for one query.
pub fn analyze_query(text: &str, today: NaiveDate) -> QueryAnalysis {
    let normalized = normalize(text);
    let entities = extract_from_normalized(&normalized);
    let signals = Signals::detect(&normalized, &entities);
    let (intent, confidence) = classify_signals(&signals);
    let dates = dates::resolve_normalized(&normalized, today);

    QueryAnalysis {
        intent,
        confidence,
        requires_real_time: signals.availability || signals.temporal,
        location_specific: signals.location,
        date_requested: signals.temporal || dates.is_some(),
        entities,
        dates,
        guests: extract_guests(text),
        content_type: content_type_from_normalized(&normalized),
    }
}
