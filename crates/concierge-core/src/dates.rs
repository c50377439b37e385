//! Relative date phrase resolution.
//!
//! Weekdays are numbered from Sunday = 0 to Saturday = 6. Offsets per
//! weekday:
//!
//! | today | this weekend | next weekend | next week |
//! |-------|--------------|--------------|-----------|
//! | Sun   | +6           | +6           | +1        |
//! | Mon   | +5           | +5           | +7        |
//! | Tue   | +4           | +4           | +6        |
//! | Wed   | +3           | +3           | +5        |
//! | Thu   | +2           | +2           | +4        |
//! | Fri   | +1           | +1           | +3        |
//! | Sat   | 0            | +7           | +2        |
//!
//! Weekends span two nights (Saturday to Monday). "tonight" is one night
//! from today and "tomorrow" three nights from tomorrow. A month name, or
//! "next month", maps to the 15th through the 18th of that month.

use chrono::{Datelike, Days, NaiveDate};

use crate::models::DateRange;
use crate::vocabulary::{self, contains_term, normalize};

const WEEKEND_NIGHTS: u64 = 2;
const DEFAULT_NIGHTS: u64 = 3;
const DEFAULT_LEAD_DAYS: u64 = 7;
const MONTH_CHECK_IN_DAY: u32 = 15;
const MONTH_CHECK_OUT_DAY: u32 = 18;

/// Resolve the first date expression in `text` relative to `today`.
///
/// Precedence: weekend phrases, "next week", "tonight", "tomorrow",
/// "next month", a month name, then a bare "available"/"book" which defaults
/// to a week from today.
pub fn resolve_dates(text: &str, today: NaiveDate) -> Option<DateRange> {
    resolve_normalized(&normalize(text), today)
}

pub(crate) fn resolve_normalized(normalized: &str, today: NaiveDate) -> Option<DateRange> {
    let dow = today.weekday().num_days_from_sunday() as u64;

    if contains_term(normalized, "this weekend") {
        return span(today, 6 - dow, WEEKEND_NIGHTS);
    }
    if contains_term(normalized, "next weekend") {
        return span(today, days_until(dow, 6), WEEKEND_NIGHTS);
    }
    if contains_term(normalized, "next week") {
        return span(today, days_until(dow, 1), DEFAULT_NIGHTS);
    }
    if contains_term(normalized, "tonight") {
        return span(today, 0, 1);
    }
    if contains_term(normalized, "tomorrow") {
        return span(today, 1, DEFAULT_NIGHTS);
    }
    if contains_term(normalized, "next month") {
        return match today.month() {
            12 => mid_month(today.year() + 1, 1),
            m => mid_month(today.year(), m + 1),
        };
    }
    if let Some(month) = first_month(normalized) {
        let year = if month < today.month() {
            today.year() + 1
        } else {
            today.year()
        };
        return mid_month(year, month);
    }
    if ["available", "availability", "book", "booking"]
        .iter()
        .any(|t| contains_term(normalized, t))
    {
        return span(today, DEFAULT_LEAD_DAYS, DEFAULT_NIGHTS);
    }
    None
}

/// Days until the next `target` weekday strictly after today.
fn days_until(dow: u64, target: u64) -> u64 {
    match (target + 7 - dow) % 7 {
        0 => 7,
        n => n,
    }
}

fn span(today: NaiveDate, offset: u64, nights: u64) -> Option<DateRange> {
    let check_in = today.checked_add_days(Days::new(offset))?;
    let check_out = check_in.checked_add_days(Days::new(nights))?;
    Some(DateRange {
        check_in,
        check_out,
    })
}

fn mid_month(year: i32, month: u32) -> Option<DateRange> {
    Some(DateRange {
        check_in: NaiveDate::from_ymd_opt(year, month, MONTH_CHECK_IN_DAY)?,
        check_out: NaiveDate::from_ymd_opt(year, month, MONTH_CHECK_OUT_DAY)?,
    })
}

/// The month named earliest in the text, 1-based.
fn first_month(normalized: &str) -> Option<u32> {
    let name = *vocabulary::month_mentions(normalized).first()?;
    vocabulary::MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 2025-10-12 is a Sunday; index i of the week is weekday i.
    fn week() -> Vec<NaiveDate> {
        let sunday = date(2025, 10, 12);
        assert_eq!(sunday.weekday().num_days_from_sunday(), 0);
        (0..7).map(|i| sunday + Days::new(i)).collect()
    }

    fn offset(text: &str, today: NaiveDate) -> (i64, i64) {
        let range = resolve_dates(text, today).expect("should resolve");
        ((range.check_in - today).num_days(), range.nights())
    }

    #[test]
    fn test_next_weekend_table() {
        let expected = [6, 5, 4, 3, 2, 1, 7];
        for (today, want) in week().into_iter().zip(expected) {
            assert_eq!(offset("next weekend", today), (want, 2), "from {}", today);
        }
    }

    #[test]
    fn test_this_weekend_table() {
        let expected = [6, 5, 4, 3, 2, 1, 0];
        for (today, want) in week().into_iter().zip(expected) {
            assert_eq!(offset("this weekend", today), (want, 2), "from {}", today);
        }
    }

    #[test]
    fn test_next_week_table() {
        let expected = [1, 7, 6, 5, 4, 3, 2];
        for (today, want) in week().into_iter().zip(expected) {
            let range = resolve_dates("next week", today).unwrap();
            assert_eq!(range.check_in.weekday(), chrono::Weekday::Mon);
            assert_eq!(offset("next week", today), (want, 3), "from {}", today);
        }
    }

    #[test]
    fn test_next_weekend_on_wednesday() {
        let wednesday = date(2025, 10, 15);
        let range = resolve_dates("Any rooms next weekend?", wednesday).unwrap();
        assert_eq!(range.check_in, date(2025, 10, 18));
        assert_eq!(range.check_out, date(2025, 10, 20));
        assert_eq!(range.check_out.weekday(), chrono::Weekday::Mon);
    }

    #[test]
    fn test_month_rolls_to_next_year() {
        let range = resolve_dates("hotels available in March", date(2025, 11, 3)).unwrap();
        assert_eq!(range.check_in, date(2026, 3, 15));
        assert_eq!(range.check_out, date(2026, 3, 18));
    }

    #[test]
    fn test_month_same_year() {
        let range = resolve_dates("a villa in July", date(2025, 2, 1)).unwrap();
        assert_eq!(range.check_in, date(2025, 7, 15));
        // current month stays in the current year
        let range = resolve_dates("November stay", date(2025, 11, 28)).unwrap();
        assert_eq!(range.check_in, date(2025, 11, 15));
    }

    #[test]
    fn test_every_month_resolves_to_the_15th() {
        let today = date(2025, 6, 10);
        for (i, name) in vocabulary::MONTHS.iter().enumerate() {
            let month = i as u32 + 1;
            let range = resolve_dates(&format!("trip in {}", name), today).unwrap();
            let year = if month < 6 { 2026 } else { 2025 };
            assert_eq!(range.check_in, date(year, month, 15), "{}", name);
            assert_eq!(range.check_out, date(year, month, 18), "{}", name);
        }
    }

    #[test]
    fn test_earliest_month_wins() {
        let range = resolve_dates("either September or June", date(2025, 1, 1)).unwrap();
        assert_eq!(range.check_in.month(), 9);
    }

    #[test]
    fn test_may_as_verb_has_no_dates() {
        let today = date(2025, 10, 15);
        assert_eq!(resolve_dates("May I swim at Vathi beach?", today), None);
        assert_eq!(resolve_dates("may we bring kids", today), None);
        let range = resolve_dates("May we come in May?", today).unwrap();
        assert_eq!(range.check_in, date(2026, 5, 15));
    }

    #[test]
    fn test_tonight_and_tomorrow() {
        let today = date(2025, 10, 15);
        let range = resolve_dates("Any room tonight?", today).unwrap();
        assert_eq!(range.check_in, today);
        assert_eq!(range.check_out, date(2025, 10, 16));

        let range = resolve_dates("arriving tomorrow", today).unwrap();
        assert_eq!(range.check_in, date(2025, 10, 16));
        assert_eq!(range.check_out, date(2025, 10, 19));
    }

    #[test]
    fn test_next_month_rolls_over_december() {
        let range = resolve_dates("something next month", date(2025, 10, 15)).unwrap();
        assert_eq!(range.check_in, date(2025, 11, 15));
        assert_eq!(range.check_out, date(2025, 11, 18));

        let range = resolve_dates("something next month", date(2025, 12, 31)).unwrap();
        assert_eq!(range.check_in, date(2026, 1, 15));
        assert_eq!(range.check_out, date(2026, 1, 18));
    }

    #[test]
    fn test_booking_default() {
        let today = date(2025, 10, 15);
        let range = resolve_dates("Can I book a room?", today).unwrap();
        assert_eq!(range.check_in, date(2025, 10, 22));
        assert_eq!(range.check_out, date(2025, 10, 25));
        assert!(resolve_dates("what is available", today).is_some());
    }

    #[test]
    fn test_specific_phrase_beats_default() {
        let today = date(2025, 10, 15);
        let range = resolve_dates("book next weekend", today).unwrap();
        assert_eq!(range.check_in, date(2025, 10, 18));
    }

    #[test]
    fn test_no_dates() {
        assert!(resolve_dates("tell me about Sifnos pottery", date(2025, 10, 15)).is_none());
        assert!(resolve_dates("", date(2025, 10, 15)).is_none());
    }
}
