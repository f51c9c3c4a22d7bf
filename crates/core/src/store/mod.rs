//! # Timetable Store
//!
//! Read access to a school's academic catalog and scheduling constraints, and
//! the transactional write path for timetable entries. The engine never
//! touches persistence except through [`TimetableStore`].

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    errors::TimetableResult,
    models::{
        catalog::{Room, SchoolDay, Section, Staff, StaffEligibility, Subject},
        constraints::{PinnedSlot, Requirement, RoomUnavailability, StaffUnavailability},
        entry::{EntryFilter, TimetableEntry},
    },
};

/// Everything the engine needs to reason about one school, read at one point in time.
///
/// Collections are kept in the store's listing order; the engine relies on that
/// order for reproducible results.
#[derive(Debug, Clone, Default)]
pub struct SchoolSnapshot {
    pub school_id: Uuid,
    /// `None` when the school has not configured its hours.
    pub school_day: Option<SchoolDay>,
    pub sections: Vec<Section>,
    pub subjects: Vec<Subject>,
    pub staff: Vec<Staff>,
    pub eligibility: Vec<StaffEligibility>,
    pub rooms: Vec<Room>,
    pub requirements: Vec<Requirement>,
    pub pinned_slots: Vec<PinnedSlot>,
    pub staff_unavailability: Vec<StaffUnavailability>,
    pub room_unavailability: Vec<RoomUnavailability>,
    pub entries: Vec<TimetableEntry>,
}

impl SchoolSnapshot {
    pub fn section(&self, id: Uuid) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn has_subject(&self, id: Uuid) -> bool {
        self.subjects.iter().any(|subject| subject.id == id)
    }

    pub fn has_staff(&self, id: Uuid) -> bool {
        self.staff.iter().any(|staff| staff.id == id)
    }

    pub fn has_room(&self, id: Uuid) -> bool {
        self.rooms.iter().any(|room| room.id == id)
    }

    pub fn entry(&self, id: Uuid) -> Option<&TimetableEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}

#[async_trait]
pub trait TimetableStore: Send + Sync {
    /// Reads the full scheduling state of a school.
    async fn load_snapshot(&self, school_id: Uuid) -> eyre::Result<SchoolSnapshot>;

    async fn find_entry(&self, school_id: Uuid, entry_id: Uuid) -> eyre::Result<Option<TimetableEntry>>;

    /// Entries matching the filter, ordered by day then start time.
    async fn list_entries(&self, school_id: Uuid, filter: &EntryFilter) -> eyre::Result<Vec<TimetableEntry>>;

    /// Atomically deletes `remove` and inserts `entry`.
    ///
    /// The store re-validates the no-overlap invariant for `entry` against the
    /// entries that remain, and fails with [`crate::errors::TimetableError::Conflict`]
    /// instead of writing when it does not hold.
    async fn commit_placement(
        &self,
        school_id: Uuid,
        remove: &[Uuid],
        entry: &TimetableEntry,
    ) -> TimetableResult<()>;

    /// Returns `false` when no such entry existed.
    async fn delete_entry(&self, school_id: Uuid, entry_id: Uuid) -> eyre::Result<bool>;

    /// Deletes every entry of the given sections and reports how many went.
    async fn delete_section_entries(&self, school_id: Uuid, section_ids: &[Uuid]) -> eyre::Result<u64>;
}
