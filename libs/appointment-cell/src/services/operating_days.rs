use chrono::{Datelike, NaiveDate, Weekday};

use directory_cell::Agency;

/// English lowercase weekday name, independent of locale.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

pub fn is_operating_day(agency: &Agency, date: NaiveDate) -> bool {
    let weekday = weekday_name(date);
    agency
        .operating_days
        .iter()
        .any(|day| day.trim().eq_ignore_ascii_case(weekday))
}
