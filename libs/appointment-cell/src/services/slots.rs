use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use directory_cell::parse_clock_time;

use crate::models::{BookableSlot, SlotError};

/// Canonical `HH:MM` form of a time value. A bare four-digit value (`0930`) gets a
/// colon after the hour; `HH:MM:SS` is accepted and truncated to minutes.
///
/// Every boundary that accepts a time (form input, stored working hours, query
/// keys) goes through this function. Normalising an already canonical value is a
/// no-op.
pub fn normalize_time(raw: &str) -> Result<String, SlotError> {
    parse_time(raw).map(|time| time.format("%H:%M").to_string())
}

fn parse_time(raw: &str) -> Result<NaiveTime, SlotError> {
    parse_clock_time(raw).ok_or_else(|| SlotError::Malformed(raw.to_string()))
}

/// Identifies a one-hour slot by its start time. Serialised as the four-digit
/// `HHMM` key used for conflict detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey(NaiveTime);

impl SlotKey {
    pub fn parse(raw: &str) -> Result<Self, SlotError> {
        parse_time(raw).map(Self::from_time)
    }

    pub fn from_time(time: NaiveTime) -> Self {
        // Slots have minute precision; seconds never take part in the key.
        let truncated = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
        Self(truncated)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// `HHMM`, no separator.
    pub fn as_key(&self) -> String {
        self.0.format("%H%M").to_string()
    }

    /// `HH:MM`.
    pub fn display_time(&self) -> String {
        self.0.format("%H:%M").to_string()
    }

    /// 12-hour label without a leading zero, e.g. `9:00 AM`.
    pub fn label(&self) -> String {
        self.0.format("%-I:%M %p").to_string()
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

impl FromStr for SlotKey {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_key())
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SlotKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Expands an adviser's stored working hours into canonical slot keys, ascending
/// and de-duplicated. Malformed entries are skipped with a warning.
pub fn resolve_template<S: AsRef<str>>(working_hours: &[S]) -> Vec<SlotKey> {
    let keys: BTreeSet<SlotKey> = working_hours
        .iter()
        .filter_map(|raw| match SlotKey::parse(raw.as_ref()) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("Skipping working hour: {}", e);
                None
            }
        })
        .collect();

    keys.into_iter().collect()
}

/// Template slots paired with their display labels.
pub fn template_slots<S: AsRef<str>>(working_hours: &[S]) -> Vec<BookableSlot> {
    resolve_template(working_hours)
        .into_iter()
        .map(BookableSlot::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_inserts_colon_into_bare_digits() {
        assert_eq!(normalize_time("0930").unwrap(), "09:30");
        assert_eq!(normalize_time("1400").unwrap(), "14:00");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["09:00", "0900", "17:45", "1745", "08:15:00"] {
            let once = normalize_time(raw).unwrap();
            assert_eq!(normalize_time(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_both_representations_give_same_key() {
        assert_eq!(SlotKey::parse("1000").unwrap(), SlotKey::parse("10:00").unwrap());
        assert_eq!(SlotKey::parse("10:00:00").unwrap().as_key(), "1000");
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(normalize_time("25:00").is_err());
        assert!(normalize_time("930").is_err());
        assert!(normalize_time("nine").is_err());
        assert!(normalize_time("").is_err());
    }

    #[test]
    fn test_labels_use_twelve_hour_form() {
        assert_eq!(SlotKey::parse("0900").unwrap().label(), "9:00 AM");
        assert_eq!(SlotKey::parse("13:30").unwrap().label(), "1:30 PM");
        assert_eq!(SlotKey::parse("00:00").unwrap().label(), "12:00 AM");
    }

    #[test]
    fn test_resolve_template_sorts_dedupes_and_skips_malformed() {
        let template = resolve_template(&["11:00", "0900", "09:00", "bogus", "1000"]);
        let keys: Vec<String> = template.iter().map(SlotKey::as_key).collect();
        assert_eq!(keys, vec!["0900", "1000", "1100"]);
    }

    #[test]
    fn test_empty_working_hours_give_empty_template() {
        let hours: Vec<String> = vec![];
        assert!(resolve_template(&hours).is_empty());
    }

    #[test]
    fn test_slot_key_serde_uses_four_digits() {
        let key = SlotKey::parse("09:00").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"0900\"");
        let parsed: SlotKey = serde_json::from_str("\"09:00\"").unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_template_slots_carry_labels() {
        let slots = template_slots(&["1500"]);
        assert_eq!(slots[0].time, "15:00");
        assert_eq!(slots[0].label, "3:00 PM");
    }
}
