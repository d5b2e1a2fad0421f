//! Time slots, scheduling days and semester calendar arithmetic.
//!
//! # Time Model
//! A weekly timetable is a grid of (day, slot) cells. Slots carry an
//! ordinal used for adjacency: two slots are consecutive iff their
//! ordinals differ by exactly one.
//!
//! A semester is divided into weeks counted from its start date. Week `w`
//! covers `[start + 7w, start + 7w + 7)`, so a weekday maps to the first
//! matching date on or after the start date, shifted by whole weeks.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Date format accepted for semester start dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A teaching period within a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: String,
    /// Position within the day (adjacent slots differ by 1).
    pub order: u32,
    /// Start time as displayed (e.g. "07:00").
    #[serde(default)]
    pub start: String,
    /// End time as displayed.
    #[serde(default)]
    pub end: String,
}

impl TimeSlot {
    /// Creates a slot without display times.
    pub fn new(id: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            order,
            start: String::new(),
            end: String::new(),
        }
    }

    /// Sets the displayed start/end times.
    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start = start.into();
        self.end = end.into();
        self
    }
}

/// A named scheduling day and its calendar weekday, when recognizable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Day {
    /// Name as given in the input.
    pub name: String,
    /// Calendar weekday. `None` if the name is not a recognizable weekday;
    /// such days can appear in a weekly timetable but never on a date.
    pub weekday: Option<Weekday>,
}

impl Day {
    /// Parses a day name ("Mon", "monday", ...).
    pub fn parse(name: impl Into<String>) -> Self {
        let name = name.into();
        let weekday = name.trim().parse::<Weekday>().ok();
        Self { name, weekday }
    }

    /// Whether this day is the rest day.
    #[inline]
    pub fn is_rest_day(&self, rest_day: Weekday) -> bool {
        self.weekday == Some(rest_day)
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
}

/// Concrete date of `weekday` in semester week `week` (0-based).
///
/// Returns `None` on calendar overflow.
pub fn lesson_date(start: NaiveDate, week: u32, weekday: Weekday) -> Option<NaiveDate> {
    let from = start.weekday().num_days_from_monday();
    let to = weekday.num_days_from_monday();
    let offset = (to + 7 - from) % 7;
    start.checked_add_days(Days::new(u64::from(offset) + 7 * u64::from(week)))
}

/// Semester week (0-based) containing `date`, or `None` before the start.
pub fn week_of(start: NaiveDate, date: NaiveDate) -> Option<u32> {
    let days = (date - start).num_days();
    if days < 0 {
        return None;
    }
    u32::try_from(days / 7).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_parse() {
        assert_eq!(Day::parse("Monday").weekday, Some(Weekday::Mon));
        assert_eq!(Day::parse("tue").weekday, Some(Weekday::Tue));
        assert_eq!(Day::parse("Thu 2").weekday, None);
        assert!(Day::parse("Sunday").is_rest_day(Weekday::Sun));
        assert!(!Day::parse("Saturday").is_rest_day(Weekday::Sun));
    }

    #[test]
    fn test_lesson_date_same_weekday_as_start() {
        // 2025-09-01 is a Monday
        let start = ymd(2025, 9, 1);
        assert_eq!(lesson_date(start, 0, Weekday::Mon), Some(start));
        assert_eq!(lesson_date(start, 1, Weekday::Mon), Some(ymd(2025, 9, 8)));
    }

    #[test]
    fn test_lesson_date_wraps_after_start() {
        // Start on a Wednesday; Monday of week 0 is the following Monday
        let start = ymd(2025, 9, 3);
        assert_eq!(lesson_date(start, 0, Weekday::Mon), Some(ymd(2025, 9, 8)));
        assert_eq!(lesson_date(start, 0, Weekday::Fri), Some(ymd(2025, 9, 5)));
        assert_eq!(week_of(start, ymd(2025, 9, 8)), Some(0));
        assert_eq!(week_of(start, ymd(2025, 9, 10)), Some(1));
    }

    #[test]
    fn test_week_of_before_start() {
        let start = ymd(2025, 9, 1);
        assert_eq!(week_of(start, ymd(2025, 8, 31)), None);
        assert_eq!(week_of(start, ymd(2025, 9, 14)), Some(1));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-02-03").unwrap(), ymd(2025, 2, 3));
        assert!(parse_date("03/02/2025").is_err());
    }
}
