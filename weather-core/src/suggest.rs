use std::time::Duration;

/// Keystroke inactivity required before a lookup is issued.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Shorter inputs never reach the geocoder.
pub const MIN_QUERY_CHARS: usize = 2;

pub const SUGGESTION_LIMIT: usize = 5;

/// The text to look up for this input, or `None` when it is too short.
pub fn lookup_text(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    let long_enough = trimmed.chars().count() >= MIN_QUERY_CHARS;
    long_enough.then_some(trimmed)
}
