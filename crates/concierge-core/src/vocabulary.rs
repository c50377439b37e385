//! Keyword and phrase tables.
//!
//! Every classifier and extractor decision is driven by the lists in this
//! module. Terms are lowercase and matched on word boundaries against
//! [`normalize`]d text, so multi-word phrases work as long as their words are
//! separated by single spaces here.

/// Place names on the island.
pub const LOCATIONS: &[&str] = &[
    "sifnos",
    "apollonia",
    "artemonas",
    "kamares",
    "kastro",
    "vathi",
    "faros",
    "platis gialos",
    "chrysopigi",
    "cheronissos",
    "exambela",
    "katavati",
    "troullaki",
    "herronisos",
    "vroulidia",
    "poulati",
];

/// Curated properties listed in the local directory.
pub const HOTEL_NAMES: &[&str] = &[
    "villa olivia clara",
    "verina astra",
    "verina suites",
    "elies resorts",
    "niriedes hotel",
    "alexandros hotel",
    "anthousa hotel",
    "kamares hotel",
    "delfini hotel",
    "petali village hotel",
];

pub const AMENITIES: &[&str] = &[
    "pool",
    "wifi",
    "wi fi",
    "parking",
    "breakfast",
    "spa",
    "gym",
    "sea view",
    "air conditioning",
    "kitchen",
    "balcony",
    "beachfront",
    "jacuzzi",
    "pet friendly",
    "family friendly",
    "airport transfer",
];

/// Relative date phrases and month names, reported verbatim as entities.
pub const DATE_PHRASES: &[&str] = &[
    "this weekend",
    "next weekend",
    "next week",
    "tonight",
    "tomorrow",
    "next month",
];

pub const MONTHS: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Availability and booking phrasing.
pub const REAL_TIME_KEYWORDS: &[&str] = &[
    "available",
    "availability",
    "book",
    "booking",
    "reserve",
    "reservation",
    "vacancy",
    "vacancies",
    "check in",
    "check out",
    "price",
    "prices",
    "rates",
    "how much",
    "free rooms",
];

pub const HOTEL_KEYWORDS: &[&str] = &[
    "hotel",
    "hotels",
    "accommodation",
    "accommodations",
    "stay",
    "room",
    "rooms",
    "villa",
    "villas",
    "suite",
    "suites",
    "resort",
    "resorts",
    "apartment",
    "apartments",
    "lodging",
    "where to sleep",
];

pub const BEACH_KEYWORDS: &[&str] = &["beach", "beaches", "swim", "swimming", "snorkeling", "bay"];

pub const FOOD_KEYWORDS: &[&str] = &[
    "restaurant",
    "restaurants",
    "taverna",
    "tavernas",
    "food",
    "eat",
    "dining",
    "dinner",
    "lunch",
    "cuisine",
    "cafe",
    "bar",
    "bars",
];

pub const ACTIVITY_KEYWORDS: &[&str] = &[
    "activity",
    "activities",
    "things to do",
    "hike",
    "hiking",
    "trail",
    "trails",
    "pottery",
    "monastery",
    "church",
    "sightseeing",
    "sunset",
    "boat trip",
    "cooking class",
    "nightlife",
    "visit",
];

pub const PLANNING_KEYWORDS: &[&str] = &[
    "plan",
    "planning",
    "itinerary",
    "trip",
    "vacation",
    "holiday",
    "honeymoon",
    "getaway",
];

/// Lowercase the text and fold everything that is not alphanumeric into
/// single spaces, padded on both ends for boundary matching.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    let mut last_space = true;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            out.push(ch);
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    if !last_space {
        out.push(' ');
    }
    out
}

/// Whether `term` occurs in already-normalized text on word boundaries.
pub fn contains_term(normalized: &str, term: &str) -> bool {
    let mut needle = String::with_capacity(term.len() + 2);
    needle.push(' ');
    needle.push_str(term);
    needle.push(' ');
    normalized.contains(&needle)
}

/// Terms from `table` present in normalized text, in table order.
pub fn matches<'a>(normalized: &str, table: &[&'a str]) -> Vec<&'a str> {
    table
        .iter()
        .copied()
        .filter(|t| contains_term(normalized, t))
        .collect()
}

pub fn any_match(normalized: &str, table: &[&str]) -> bool {
    table.iter().any(|t| contains_term(normalized, t))
}

/// Words after which "may" names the month rather than asking permission.
const MAY_LEADS: &[&str] = &[
    "in", "during", "for", "until", "till", "early", "late", "mid", "of", "since", "by", "from",
    "next", "this", "last", "end",
];

/// Month names in normalized text, in the order they appear.
///
/// "may" only counts after a preposition such as "in" or next to a number
/// ("may 20", "3 may"), so "May I swim at Vathi?" names no month.
pub fn month_mentions(normalized: &str) -> Vec<&'static str> {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let mut found: Vec<&'static str> = Vec::new();
    for (i, word) in words.iter().enumerate() {
        let Some(month) = MONTHS.iter().copied().find(|m| m == word) else {
            continue;
        };
        if month == "may" && !may_is_month(&words, i) {
            continue;
        }
        if !found.contains(&month) {
            found.push(month);
        }
    }
    found
}

fn may_is_month(words: &[&str], i: usize) -> bool {
    let numeric = |w: &&str| w.chars().next().is_some_and(|c| c.is_ascii_digit());
    let prev = i.checked_sub(1).and_then(|p| words.get(p));
    let next = words.get(i + 1);
    prev.is_some_and(|w| MAY_LEADS.contains(w) || numeric(w)) || next.is_some_and(numeric)
}
