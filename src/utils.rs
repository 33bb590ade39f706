use chrono::{DateTime, SecondsFormat, Utc};

/// Format a moment the way item timestamps are stored (`2024-01-31T12:00:00.000Z`)
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Shorten text for single-line display, collapsing whitespace
pub fn preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let mut short: String = collapsed.chars().take(max_chars).collect();
    short.push('…');
    short
}
