use chrono::NaiveTime;

use crate::{
    errors::{TimetableError, TimetableResult},
    models::{
        catalog::SchoolDay,
        time::{DAYS_PER_WEEK, TimeRange, add_minutes},
    },
};

/// Spacing between consecutive candidate start times.
pub const GRID_STEP_MINUTES: u32 = 30;

/// Rejects lesson lengths that are not a positive multiple of the grid step.
pub fn validate_duration(duration_minutes: u32) -> TimetableResult<()> {
    if duration_minutes == 0 || duration_minutes % GRID_STEP_MINUTES != 0 {
        return Err(TimetableError::Validation(format!(
            "Duration must be a positive multiple of {} minutes, got {}",
            GRID_STEP_MINUTES, duration_minutes
        )));
    }
    Ok(())
}

/// Discrete start times of a school day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    day: SchoolDay,
}

impl TimeGrid {
    pub fn new(day: SchoolDay) -> TimetableResult<Self> {
        if day.end_time <= day.start_time {
            return Err(TimetableError::Validation(format!(
                "School day must end after it starts ({} - {})",
                day.start_time, day.end_time
            )));
        }
        Ok(Self { day })
    }

    pub fn school_day(&self) -> SchoolDay {
        self.day
    }

    /// Days in search order, Monday first.
    pub fn days(&self) -> impl Iterator<Item = u8> {
        0..DAYS_PER_WEEK
    }

    /// Every grid start time, from the opening time in fixed steps.
    pub fn starts(&self) -> Vec<NaiveTime> {
        let mut starts = Vec::new();
        let mut current = Some(self.day.start_time);
        while let Some(time) = current {
            if time >= self.day.end_time {
                break;
            }
            starts.push(time);
            current = add_minutes(time, GRID_STEP_MINUTES);
        }
        starts
    }

    /// Lesson ranges of the given length that fit the school day, in ascending order.
    ///
    /// With a `window`, only ranges lying entirely inside it are returned.
    pub fn candidates(&self, duration_minutes: u32, window: Option<TimeRange>) -> Vec<TimeRange> {
        self.starts()
            .into_iter()
            .filter_map(|start| TimeRange::starting_at(start, duration_minutes))
            .filter(|range| range.end <= self.day.end_time)
            .filter(|range| window.is_none_or(|window| window.contains(range)))
            .collect()
    }
}
