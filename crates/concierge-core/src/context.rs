//! Rolling conversation context.

use chrono::{DateTime, Utc};

use crate::models::{ConversationContext, Message, Role};
use crate::vocabulary::{self, normalize};

pub const DEFAULT_WINDOW: usize = 5;
pub const SUMMARY_MAX_CHARS: usize = 300;
const DEFAULT_TOPIC: &str = "Sifnos travel";

impl ConversationContext {
    /// Summarize the last `window` user messages of a transcript.
    ///
    /// Returns `None` when the transcript has no user messages.
    pub fn from_messages(
        messages: &[Message],
        window: usize,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let mut recent: Vec<&Message> = messages
            .iter()
            .rev()
            .filter(|m| m.role == Role::User && !m.content.trim().is_empty())
            .take(window)
            .collect();
        if recent.is_empty() {
            return None;
        }
        recent.reverse();

        let topic = recent
            .iter()
            .rev()
            .find_map(|m| {
                let normalized = normalize(&m.content);
                vocabulary::matches(&normalized, vocabulary::LOCATIONS)
                    .into_iter()
                    .rfind(|loc| *loc != "sifnos")
                    .map(capitalize)
            })
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string());

        let joined = recent
            .iter()
            .map(|m| m.content.trim())
            .collect::<Vec<_>>()
            .join(" | ");

        Some(Self {
            topic,
            summary: truncate_chars(&joined, SUMMARY_MAX_CHARS),
            timestamp: now,
        })
    }
}

/// Title-case every word of a place name.
fn capitalize(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Cut to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
