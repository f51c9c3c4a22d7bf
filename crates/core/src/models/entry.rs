use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{conflict::SlotClaim, time::TimeRange};

/// A scheduled lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: Uuid,
    pub school_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub staff_id: Uuid,
    pub room_id: Option<Uuid>,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl TimetableEntry {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    pub fn placement(&self) -> LessonPlacement {
        LessonPlacement {
            section_id: self.section_id,
            subject_id: self.subject_id,
            staff_id: self.staff_id,
            room_id: self.room_id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Where and when a lesson should take place, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPlacement {
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub staff_id: Uuid,
    #[serde(default)]
    pub room_id: Option<Uuid>,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl LessonPlacement {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    /// Every resource the lesson occupies.
    pub fn claim(&self) -> SlotClaim {
        SlotClaim {
            section_id: Some(self.section_id),
            staff_id: Some(self.staff_id),
            room_id: self.room_id,
            day_of_week: self.day_of_week,
            range: self.range(),
        }
    }

    pub fn into_entry(self, id: Uuid, school_id: Uuid, created_at: DateTime<Utc>) -> TimetableEntry {
        TimetableEntry {
            id,
            school_id,
            section_id: self.section_id,
            subject_id: self.subject_id,
            staff_id: self.staff_id,
            room_id: self.room_id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            created_at,
        }
    }
}

/// Body of a create or update call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRequest {
    #[serde(flatten)]
    pub placement: LessonPlacement,
    #[serde(default)]
    pub override_conflict: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFilter {
    pub section_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub day_of_week: Option<u8>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &TimetableEntry) -> bool {
        self.section_id.is_none_or(|id| id == entry.section_id)
            && self.staff_id.is_none_or(|id| id == entry.staff_id)
            && self.room_id.is_none_or(|id| Some(id) == entry.room_id)
            && self.day_of_week.is_none_or(|day| day == entry.day_of_week)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteEntryResponse {
    pub id: Uuid,
    pub deleted: bool,
}
