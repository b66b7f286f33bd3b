//! Display helpers shared by every front end.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};

/// Escape text for embedding in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// First `max_chars` characters of `text`, with "..." when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Whether `pattern` is a chrono format string without unknown specifiers.
pub fn is_valid_time_format(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Format a backend timestamp for the card footer.
///
/// Accepts RFC 3339 or a bare `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC) and
/// renders it at `utc_offset_minutes` using a chrono format string.
/// Anything unparseable, or a pattern chrono cannot render, gives an empty
/// string.
pub fn format_updated_at(raw: Option<&str>, utc_offset_minutes: i32, pattern: &str) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };

    let instant = match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(_) => match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            Ok(naive) => naive.and_utc(),
            Err(_) => return String::new(),
        },
    };

    let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix());

    let mut out = String::new();
    match write!(out, "{}", instant.with_timezone(&offset).format(pattern)) {
        Ok(()) => out,
        Err(_) => String::new(),
    }
}
