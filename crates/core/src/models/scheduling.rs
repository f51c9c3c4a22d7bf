use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{constraints::Requirement, entry::TimetableEntry};

/// Criteria for finding the next free slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub section_id: Option<Uuid>,
    /// Must exist when given; does not narrow the search.
    #[serde(default)]
    pub subject_id: Option<Uuid>,
    #[serde(default)]
    pub staff_id: Option<Uuid>,
    #[serde(default)]
    pub day_of_week: Option<u8>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub preferred_room_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedSlot {
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_id: Option<Uuid>,
}

fn default_true() -> bool {
    true
}

/// Options for weekly generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Sections to schedule. `None` schedules every section of the school.
    #[serde(default)]
    pub target_section_ids: Option<Vec<Uuid>>,

    /// Treat pinned slots as occupied. Default `true`.
    #[serde(default = "default_true")]
    pub include_pinned: bool,

    /// Treat staff and room unavailability as hard constraints. Default `true`.
    #[serde(default = "default_true")]
    pub honor_unavailability: bool,

    /// Soft window tried before the full school day. Default none.
    #[serde(default)]
    pub preferred_start_time: Option<NaiveTime>,

    #[serde(default)]
    pub preferred_end_time: Option<NaiveTime>,

    /// Pinned slots count toward `periods_per_week` of their subject. Default `true`.
    #[serde(default = "default_true")]
    pub count_pinned: bool,

    /// Delete existing entries of the targeted sections first. Default `false`.
    #[serde(default)]
    pub clear_existing: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            target_section_ids: None,
            include_pinned: true,
            honor_unavailability: true,
            preferred_start_time: None,
            preferred_end_time: None,
            count_pinned: true,
            clear_existing: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsatisfiedRequirement {
    pub requirement: Requirement,
    /// Occurrences that could not be placed.
    pub missing: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub placed_count: usize,
    pub placements: Vec<TimetableEntry>,
    pub unsatisfied: Vec<UnsatisfiedRequirement>,
}
