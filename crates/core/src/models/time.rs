use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Days are numbered 0 (Monday) through 6 (Sunday).
pub const DAYS_PER_WEEK: u8 = 7;

const DAY_NAMES: [&str; DAYS_PER_WEEK as usize] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn day_name(day_of_week: u8) -> &'static str {
    DAY_NAMES
        .get(day_of_week as usize)
        .copied()
        .unwrap_or("Unknown")
}

pub fn is_valid_day(day_of_week: u8) -> bool {
    day_of_week < DAYS_PER_WEEK
}

/// Minutes elapsed since midnight.
pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// Adds whole minutes to a time of day, refusing to wrap past midnight.
pub fn add_minutes(time: NaiveTime, minutes: u32) -> Option<NaiveTime> {
    let (shifted, wrapped) = time.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
    (wrapped == 0).then_some(shifted)
}

/// Half-open time interval `[start, end)` within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Builds `[start, start + minutes)`, or `None` if it would cross midnight.
    pub fn starting_at(start: NaiveTime, minutes: u32) -> Option<Self> {
        add_minutes(start, minutes).map(|end| Self { start, end })
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn minutes(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_minutes()
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Minutes of free time between two disjoint ranges; `None` when they overlap.
    pub fn gap_to(&self, other: &TimeRange) -> Option<i64> {
        if self.end <= other.start {
            Some(other.start.signed_duration_since(self.end).num_minutes())
        } else if other.end <= self.start {
            Some(self.start.signed_duration_since(other.end).num_minutes())
        } else {
            None
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}
