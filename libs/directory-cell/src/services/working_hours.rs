use chrono::Duration;

use crate::models::Agency;
use crate::services::clock::parse_clock_time;

/// Candidate working hours for advisers of `agency`: one-hour steps from the
/// opening time up to, but excluding, the closing time. Empty when either bound
/// is missing or malformed.
pub fn working_hour_options(agency: &Agency) -> Vec<String> {
    let (Some(start), Some(end)) = (
        agency.operating_hours_start.as_deref().and_then(parse_clock_time),
        agency.operating_hours_end.as_deref().and_then(parse_clock_time),
    ) else {
        return vec![];
    };

    let mut options = Vec::new();
    let mut current = start;
    while current < end {
        options.push(current.format("%H:%M").to_string());

        let (next, wrapped) = current.overflowing_add_signed(Duration::hours(1));
        if wrapped != 0 {
            break;
        }
        current = next;
    }

    options
}
