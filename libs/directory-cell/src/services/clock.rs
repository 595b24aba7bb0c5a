use chrono::NaiveTime;

/// Parses a stored or submitted time of day. A bare four-digit value (`0930`)
/// gets a colon after the hour; `HH:MM:SS` is accepted as well.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();

    let candidate = if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("{}:{}", &trimmed[..2], &trimmed[2..])
    } else {
        trimmed.to_string()
    };

    NaiveTime::parse_from_str(&candidate, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&candidate, "%H:%M:%S"))
        .ok()
}

/// Canonical `HH:MM` form, or `None` when `raw` is not a time.
pub fn normalize_clock_time(raw: &str) -> Option<String> {
    parse_clock_time(raw).map(|time| time.format("%H:%M").to_string())
}
