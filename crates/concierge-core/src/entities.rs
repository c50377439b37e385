//! Entity extraction over the vocabulary tables.

use crate::models::{ContentType, Entities, Guests};
use crate::vocabulary::{self, normalize};

/// Pull locations, date phrases, amenities and property names out of `text`.
///
/// Pure and total: unknown text yields empty sets.
pub fn extract_entities(text: &str) -> Entities {
    let normalized = normalize(text);
    extract_from_normalized(&normalized)
}

pub(crate) fn extract_from_normalized(normalized: &str) -> Entities {
    let mut dates: Vec<String> = owned(vocabulary::matches(normalized, vocabulary::DATE_PHRASES));
    dates.extend(owned::<Vec<String>>(vocabulary::month_mentions(normalized)));

    Entities {
        locations: owned(vocabulary::matches(normalized, vocabulary::LOCATIONS)),
        dates,
        amenities: owned(vocabulary::matches(normalized, vocabulary::AMENITIES)),
        hotel_names: owned(vocabulary::matches(normalized, vocabulary::HOTEL_NAMES)),
    }
}

fn owned<C: FromIterator<String>>(terms: Vec<&str>) -> C {
    terms.into_iter().map(str::to_string).collect()
}

/// Party size from phrases like "2 adults and 1 child" or "for 4 people".
///
/// Defaults to two adults and no children for whatever is not stated.
pub fn extract_guests(text: &str) -> Guests {
    let normalized = normalize(text);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let mut guests = Guests::default();

    for pair in words.windows(2) {
        let Some(n) = parse_count(pair[0]) else {
            continue;
        };
        match pair[1] {
            "adult" | "adults" | "people" | "persons" | "guests" => guests.adults = n,
            "child" | "children" | "kid" | "kids" => guests.children = n,
            _ => {}
        }
    }

    guests.adults = guests.adults.max(1);
    guests
}

fn parse_count(word: &str) -> Option<u32> {
    if let Ok(n) = word.parse::<u32>() {
        return (n <= 20).then_some(n);
    }
    let n = match word {
        "one" | "a" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        _ => return None,
    };
    Some(n)
}

/// Content category for the local content backend, if the query names one.
pub fn content_type_filter(text: &str) -> Option<ContentType> {
    let normalized = normalize(text);
    content_type_from_normalized(&normalized)
}

pub(crate) fn content_type_from_normalized(normalized: &str) -> Option<ContentType> {
    if vocabulary::any_match(normalized, vocabulary::BEACH_KEYWORDS) {
        Some(ContentType::Beaches)
    } else if vocabulary::any_match(normalized, vocabulary::FOOD_KEYWORDS) {
        Some(ContentType::Restaurants)
    } else if vocabulary::any_match(normalized, vocabulary::ACTIVITY_KEYWORDS) {
        Some(ContentType::Activities)
    } else {
        None
    }
}
