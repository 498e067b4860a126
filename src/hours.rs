//! Worked-hours interval rules.

use chrono::{NaiveDate, NaiveTime};

/// A closed `[start, end]` span within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Interval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Inclusive on both ends: `[12:30, 15:50]` and `[15:50, 16:00]` intersect.
    pub fn intersects(&self, other: &Interval) -> bool {
        other.start <= self.end && other.end >= self.start
    }
}

/// True if `[start, end]` intersects any of the employee's existing intervals
/// on the same date.
pub fn has_overlap<'a, I>(existing: I, start: NaiveTime, end: NaiveTime) -> bool
where
    I: IntoIterator<Item = &'a Interval>,
{
    let candidate = Interval::new(start, end);
    existing
        .into_iter()
        .any(|interval| interval.intersects(&candidate))
}

const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(input, format).ok())
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
}
