use chrono::{DateTime, NaiveTime, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timetabler_core::models::{
    catalog::{Room, SchoolDay, Section, Staff, StaffEligibility, Subject},
    constraints::{PinnedSlot, Requirement, RoomUnavailability, StaffUnavailability},
    entry::TimetableEntry,
};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSchoolSettings {
    pub school_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSection {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
    pub level_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSubject {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStaff {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStaffSubject {
    pub staff_id: Uuid,
    pub subject_id: Uuid,
    pub level_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRoom {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
    pub room_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRequirement {
    pub id: Uuid,
    pub school_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub periods_per_week: i32,
    pub duration_minutes: i32,
    pub min_gap_mins: i32,
    pub allow_double: bool,
    pub preferred_room_type: Option<String>,
    pub staff_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPinnedSlot {
    pub id: Uuid,
    pub school_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Row shape shared by `staff_unavailability` and `room_unavailability`;
/// `resource_id` is the staff or room id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUnavailability {
    pub id: Uuid,
    pub school_id: Uuid,
    pub resource_id: Uuid,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTimetableEntry {
    pub id: Uuid,
    pub school_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub staff_id: Uuid,
    pub room_id: Option<Uuid>,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

fn day_from_db(value: i16) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|day| *day < 7)
        .ok_or_else(|| eyre!("Invalid day_of_week in database: {}", value))
}

fn count_from_db(column: &str, value: i32) -> Result<u32> {
    u32::try_from(value).map_err(|_| eyre!("Negative {} in database: {}", column, value))
}

impl From<DbSchoolSettings> for SchoolDay {
    fn from(row: DbSchoolSettings) -> Self {
        SchoolDay {
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

impl From<DbSection> for Section {
    fn from(row: DbSection) -> Self {
        Section {
            id: row.id,
            school_id: row.school_id,
            name: row.name,
            level_id: row.level_id,
        }
    }
}

impl From<DbSubject> for Subject {
    fn from(row: DbSubject) -> Self {
        Subject {
            id: row.id,
            school_id: row.school_id,
            name: row.name,
        }
    }
}

impl From<DbStaff> for Staff {
    fn from(row: DbStaff) -> Self {
        Staff {
            id: row.id,
            school_id: row.school_id,
            name: row.name,
        }
    }
}

impl From<DbStaffSubject> for StaffEligibility {
    fn from(row: DbStaffSubject) -> Self {
        StaffEligibility {
            staff_id: row.staff_id,
            subject_id: row.subject_id,
            level_id: row.level_id,
        }
    }
}

impl From<DbRoom> for Room {
    fn from(row: DbRoom) -> Self {
        Room {
            id: row.id,
            school_id: row.school_id,
            name: row.name,
            room_type: row.room_type,
        }
    }
}

impl TryFrom<DbRequirement> for Requirement {
    type Error = eyre::Report;

    fn try_from(row: DbRequirement) -> Result<Self> {
        Ok(Requirement {
            id: row.id,
            school_id: row.school_id,
            section_id: row.section_id,
            subject_id: row.subject_id,
            periods_per_week: count_from_db("periods_per_week", row.periods_per_week)?,
            duration_minutes: count_from_db("duration_minutes", row.duration_minutes)?,
            min_gap_mins: count_from_db("min_gap_mins", row.min_gap_mins)?,
            allow_double: row.allow_double,
            preferred_room_type: row.preferred_room_type,
            staff_id: row.staff_id,
        })
    }
}

impl TryFrom<DbPinnedSlot> for PinnedSlot {
    type Error = eyre::Report;

    fn try_from(row: DbPinnedSlot) -> Result<Self> {
        Ok(PinnedSlot {
            id: row.id,
            school_id: row.school_id,
            section_id: row.section_id,
            subject_id: row.subject_id,
            staff_id: row.staff_id,
            room_id: row.room_id,
            day_of_week: day_from_db(row.day_of_week)?,
            start_time: row.start_time,
            end_time: row.end_time,
        })
    }
}

impl TryFrom<DbUnavailability> for StaffUnavailability {
    type Error = eyre::Report;

    fn try_from(row: DbUnavailability) -> Result<Self> {
        Ok(StaffUnavailability {
            id: row.id,
            school_id: row.school_id,
            staff_id: row.resource_id,
            day_of_week: day_from_db(row.day_of_week)?,
            start_time: row.start_time,
            end_time: row.end_time,
        })
    }
}

impl TryFrom<DbUnavailability> for RoomUnavailability {
    type Error = eyre::Report;

    fn try_from(row: DbUnavailability) -> Result<Self> {
        Ok(RoomUnavailability {
            id: row.id,
            school_id: row.school_id,
            room_id: row.resource_id,
            day_of_week: day_from_db(row.day_of_week)?,
            start_time: row.start_time,
            end_time: row.end_time,
        })
    }
}

impl TryFrom<DbTimetableEntry> for TimetableEntry {
    type Error = eyre::Report;

    fn try_from(row: DbTimetableEntry) -> Result<Self> {
        Ok(TimetableEntry {
            id: row.id,
            school_id: row.school_id,
            section_id: row.section_id,
            subject_id: row.subject_id,
            staff_id: row.staff_id,
            room_id: row.room_id,
            day_of_week: day_from_db(row.day_of_week)?,
            start_time: row.start_time,
            end_time: row.end_time,
            created_at: row.created_at,
        })
    }
}

impl From<&TimetableEntry> for DbTimetableEntry {
    fn from(entry: &TimetableEntry) -> Self {
        DbTimetableEntry {
            id: entry.id,
            school_id: entry.school_id,
            section_id: entry.section_id,
            subject_id: entry.subject_id,
            staff_id: entry.staff_id,
            room_id: entry.room_id,
            day_of_week: i16::from(entry.day_of_week),
            start_time: entry.start_time,
            end_time: entry.end_time,
            created_at: entry.created_at,
        }
    }
}

/// Converts every row, failing on the first malformed one.
pub fn convert_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = eyre::Report>,
{
    rows.into_iter().map(T::try_from).collect()
}
