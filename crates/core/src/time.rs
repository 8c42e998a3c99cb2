//! Wall-clock helpers shared by the scheduling pipeline.
//!
//! All times are local to the service point. Stored hours are `HH:MM` or
//! `HH:MM:SS` strings, day-of-week keys are lowercase English day names.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};

pub const DAY_KEYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

pub fn weekday_key(weekday: Weekday) -> &'static str {
    DAY_KEYS[weekday.num_days_from_monday() as usize]
}

/// Lowercase day name used as the key into `working_hours` / `working_days`.
pub fn day_key(date: NaiveDate) -> &'static str {
    weekday_key(date.weekday())
}

/// Weekday number as stored on schedule templates (0 = Sunday .. 6 = Saturday).
pub fn weekday_number(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Adds minutes to a wall-clock time, returning `None` past midnight.
pub fn add_minutes(time: NaiveTime, minutes: i64) -> Option<NaiveTime> {
    let (next, wrapped) = time.overflowing_add_signed(Duration::minutes(minutes));
    if wrapped != 0 { None } else { Some(next) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("09:00", Some((9, 0, 0)))]
    #[case("09:30:15", Some((9, 30, 15)))]
    #[case(" 18:00 ", Some((18, 0, 0)))]
    #[case("9am", None)]
    #[case("25:00", None)]
    #[case("", None)]
    fn parses_clock_strings(#[case] input: &str, #[case] expected: Option<(u32, u32, u32)>) {
        let expected = expected.map(|(h, m, s)| NaiveTime::from_hms_opt(h, m, s).unwrap());
        assert_eq!(parse_clock(input), expected);
    }

    #[test]
    fn day_keys_follow_calendar() {
        // 2024-01-02 is a Tuesday.
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(day_key(date), "tuesday");
        assert_eq!(weekday_number(date), 2);

        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(day_key(sunday), "sunday");
        assert_eq!(weekday_number(sunday), 0);
    }

    #[test]
    fn add_minutes_does_not_wrap() {
        let late = NaiveTime::from_hms_opt(23, 30, 0).unwrap();
        assert_eq!(add_minutes(late, 29), NaiveTime::from_hms_opt(23, 59, 0));
        assert_eq!(add_minutes(late, 30), None);
    }
}
