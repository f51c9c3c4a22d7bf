use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::TimeRange;

/// How many lessons of a subject a section needs each week, and their shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: Uuid,
    pub school_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub periods_per_week: u32,
    pub duration_minutes: u32,
    /// Minimum minutes between two same-day occurrences.
    #[serde(default)]
    pub min_gap_mins: u32,
    /// Permits one back-to-back pair per day.
    #[serde(default)]
    pub allow_double: bool,
    #[serde(default)]
    pub preferred_room_type: Option<String>,
    /// Assigned teacher; when absent any eligible teacher may take the lesson.
    #[serde(default)]
    pub staff_id: Option<Uuid>,
}

/// A lesson fixed in place that generation must treat as occupied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedSlot {
    pub id: Uuid,
    pub school_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl PinnedSlot {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffUnavailability {
    pub id: Uuid,
    pub school_id: Uuid,
    pub staff_id: Uuid,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl StaffUnavailability {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomUnavailability {
    pub id: Uuid,
    pub school_id: Uuid,
    pub room_id: Uuid,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl RoomUnavailability {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}
