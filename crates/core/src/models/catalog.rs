use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Configured opening hours of a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolDay {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Default for SchoolDay {
    fn default() -> Self {
        Self {
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
    pub level_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
}

/// A teacher may teach a subject, optionally only at one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffEligibility {
    pub staff_id: Uuid,
    pub subject_id: Uuid,
    pub level_id: Option<Uuid>,
}

impl StaffEligibility {
    pub fn covers(&self, subject_id: Uuid, level_id: Uuid) -> bool {
        self.subject_id == subject_id && self.level_id.is_none_or(|level| level == level_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
    pub room_type: Option<String>,
}
