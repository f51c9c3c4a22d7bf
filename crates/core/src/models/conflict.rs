use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::TimeRange;

/// Why a candidate placement cannot take its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictReason {
    SectionBusy,
    StaffBusy,
    RoomBusy,
    StaffUnavailable,
    RoomUnavailable,
    PinnedConflict,
}

impl ConflictReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictReason::SectionBusy => "SECTION_BUSY",
            ConflictReason::StaffBusy => "STAFF_BUSY",
            ConflictReason::RoomBusy => "ROOM_BUSY",
            ConflictReason::StaffUnavailable => "STAFF_UNAVAILABLE",
            ConflictReason::RoomUnavailable => "ROOM_UNAVAILABLE",
            ConflictReason::PinnedConflict => "PINNED_CONFLICT",
        }
    }

    /// Whether deleting the blocking entry can clear this reason.
    pub fn is_overridable(&self) -> bool {
        matches!(
            self,
            ConflictReason::SectionBusy | ConflictReason::StaffBusy | ConflictReason::RoomBusy
        )
    }
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn format_reasons(reasons: &[ConflictReason]) -> String {
    reasons
        .iter()
        .map(ConflictReason::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The resources a candidate would occupy. Absent ids are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotClaim {
    pub section_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub day_of_week: u8,
    pub range: TimeRange,
}

/// A single overlap found by the conflict checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub reason: ConflictReason,
    /// The timetable entry responsible, when the blocker is an entry.
    pub entry_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConflictRequest {
    pub section_id: Uuid,
    pub staff_id: Uuid,
    #[serde(default)]
    pub room_id: Option<Uuid>,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub exclude_entry_id: Option<Uuid>,
}

impl CheckConflictRequest {
    pub fn claim(&self) -> SlotClaim {
        SlotClaim {
            section_id: Some(self.section_id),
            staff_id: Some(self.staff_id),
            room_id: self.room_id,
            day_of_week: self.day_of_week,
            range: TimeRange::new(self.start_time, self.end_time),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConflictResponse {
    pub conflicts: Vec<ConflictReason>,
}
