//! PostgreSQL implementation of [`TimetableStore`].
//!
//! Snapshots are read inside one repeatable-read transaction so every
//! collection reflects the same instant. Placement commits run in a
//! serializable transaction; the exclusion constraints on
//! `timetable_entries` reject any overlap that slipped past the engine's
//! advisory check, and the violated constraint is mapped back to a conflict
//! reason. A serialization failure is reported as a conflict when the entries
//! committed by the winning transaction overlap the placement.

use async_trait::async_trait;
use eyre::Result;
use timetabler_core::{
    errors::{TimetableError, TimetableResult},
    models::{
        conflict::ConflictReason,
        entry::{EntryFilter, TimetableEntry},
    },
    scheduler::{availability::AvailabilityIndex, conflict::check_conflict},
    store::{SchoolSnapshot, TimetableStore},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    DbPool,
    models::{DbTimetableEntry, convert_rows},
    repositories::{catalog, constraints, entries},
    schema::{ROOM_OVERLAP_CONSTRAINT, SECTION_OVERLAP_CONSTRAINT, STAFF_OVERLAP_CONSTRAINT},
};

const EXCLUSION_VIOLATION: &str = "23P01";
const SERIALIZATION_FAILURE: &str = "40001";

#[derive(Debug, Clone)]
pub struct PgTimetableStore {
    pool: DbPool,
}

impl PgTimetableStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Deletes `remove` and inserts `entry` in one serializable transaction.
    async fn write_placement(&self, school_id: Uuid, remove: &[Uuid], entry: &TimetableEntry) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        if !remove.is_empty() {
            let removed = entries::delete_entries_by_ids(&mut *tx, school_id, remove).await?;
            debug!("Removed {} entries before placing {}", removed, entry.id);
        }

        entries::insert_entry(&mut *tx, &DbTimetableEntry::from(entry)).await?;
        tx.commit().await?;
        Ok(())
    }

    /// A serialization failure means a concurrent write won the race. The
    /// entries now stored tell whether that write took the requested slot;
    /// if none overlaps, the failure is returned as a database error.
    async fn explain_serialization_failure(
        &self,
        school_id: Uuid,
        remove: &[Uuid],
        entry: &TimetableEntry,
        report: eyre::Report,
    ) -> TimetableResult<()> {
        let rows = entries::get_entries_by_school_id(
            &self.pool,
            school_id,
            None,
            None,
            None,
            Some(i16::from(entry.day_of_week)),
        )
        .await?;
        let stored: Vec<TimetableEntry> = convert_rows(rows)?;

        let reasons = overlap_reasons(&stored, remove, entry);
        if reasons.is_empty() {
            warn!(
                "Serialization failure placing entry {} for school {} without an overlap",
                entry.id, school_id
            );
            return Err(TimetableError::Database(report));
        }
        warn!(
            "Concurrent write took the slot of entry {} for school {}: {:?}",
            entry.id, school_id, reasons
        );
        Err(TimetableError::Conflict(reasons))
    }
}

/// Conflict reason guarded by an exclusion constraint, if `constraint` is one.
pub fn reason_for_constraint(constraint: &str) -> Option<ConflictReason> {
    match constraint {
        SECTION_OVERLAP_CONSTRAINT => Some(ConflictReason::SectionBusy),
        STAFF_OVERLAP_CONSTRAINT => Some(ConflictReason::StaffBusy),
        ROOM_OVERLAP_CONSTRAINT => Some(ConflictReason::RoomBusy),
        _ => None,
    }
}

pub fn is_serialization_failure(report: &eyre::Report) -> bool {
    matches!(
        report.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(err)) if err.code().as_deref() == Some(SERIALIZATION_FAILURE)
    )
}

/// Reasons `entry` cannot sit beside `stored`, ignoring the entries it replaces.
pub fn overlap_reasons(stored: &[TimetableEntry], remove: &[Uuid], entry: &TimetableEntry) -> Vec<ConflictReason> {
    let mut index = AvailabilityIndex::new();
    for existing in stored
        .iter()
        .filter(|existing| existing.id != entry.id && !remove.contains(&existing.id))
    {
        index.add_entry(existing);
    }
    check_conflict(&index, &entry.placement().claim(), None)
}

/// Turns an exclusion violation into [`TimetableError::Conflict`]; anything
/// else stays a database error.
pub fn map_commit_error(report: eyre::Report) -> TimetableError {
    let reason = match report.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(err)) if err.code().as_deref() == Some(EXCLUSION_VIOLATION) => {
            err.constraint().and_then(reason_for_constraint)
        }
        _ => None,
    };
    match reason {
        Some(reason) => TimetableError::Conflict(vec![reason]),
        None => TimetableError::Database(report),
    }
}

#[async_trait]
impl TimetableStore for PgTimetableStore {
    async fn load_snapshot(&self, school_id: Uuid) -> Result<SchoolSnapshot> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let school_day = catalog::get_school_settings(&mut *tx, school_id).await?.map(Into::into);
        let sections = catalog::get_sections_by_school_id(&mut *tx, school_id).await?;
        let subjects = catalog::get_subjects_by_school_id(&mut *tx, school_id).await?;
        let staff = catalog::get_staff_by_school_id(&mut *tx, school_id).await?;
        let eligibility = catalog::get_staff_subjects_by_school_id(&mut *tx, school_id).await?;
        let rooms = catalog::get_rooms_by_school_id(&mut *tx, school_id).await?;
        let requirements = constraints::get_requirements_by_school_id(&mut *tx, school_id).await?;
        let pinned_slots = constraints::get_pinned_slots_by_school_id(&mut *tx, school_id).await?;
        let staff_unavailability = constraints::get_staff_unavailability_by_school_id(&mut *tx, school_id).await?;
        let room_unavailability = constraints::get_room_unavailability_by_school_id(&mut *tx, school_id).await?;
        let timetable = entries::get_entries_by_school_id(&mut *tx, school_id, None, None, None, None).await?;

        tx.commit().await?;

        debug!(
            "Loaded snapshot for school {}: {} sections, {} requirements, {} entries",
            school_id,
            sections.len(),
            requirements.len(),
            timetable.len()
        );

        Ok(SchoolSnapshot {
            school_id,
            school_day,
            sections: sections.into_iter().map(Into::into).collect(),
            subjects: subjects.into_iter().map(Into::into).collect(),
            staff: staff.into_iter().map(Into::into).collect(),
            eligibility: eligibility.into_iter().map(Into::into).collect(),
            rooms: rooms.into_iter().map(Into::into).collect(),
            requirements: convert_rows(requirements)?,
            pinned_slots: convert_rows(pinned_slots)?,
            staff_unavailability: convert_rows(staff_unavailability)?,
            room_unavailability: convert_rows(room_unavailability)?,
            entries: convert_rows(timetable)?,
        })
    }

    async fn find_entry(&self, school_id: Uuid, entry_id: Uuid) -> Result<Option<TimetableEntry>> {
        entries::get_entry_by_id(&self.pool, school_id, entry_id)
            .await?
            .map(TimetableEntry::try_from)
            .transpose()
    }

    async fn list_entries(&self, school_id: Uuid, filter: &EntryFilter) -> Result<Vec<TimetableEntry>> {
        let rows = entries::get_entries_by_school_id(
            &self.pool,
            school_id,
            filter.section_id,
            filter.staff_id,
            filter.room_id,
            filter.day_of_week.map(i16::from),
        )
        .await?;
        convert_rows(rows)
    }

    async fn commit_placement(
        &self,
        school_id: Uuid,
        remove: &[Uuid],
        entry: &TimetableEntry,
    ) -> TimetableResult<()> {
        match self.write_placement(school_id, remove, entry).await {
            Ok(()) => Ok(()),
            Err(report) if is_serialization_failure(&report) => {
                self.explain_serialization_failure(school_id, remove, entry, report)
                    .await
            }
            Err(report) => {
                let error = map_commit_error(report);
                if let TimetableError::Conflict(reasons) = &error {
                    warn!("Database rejected entry {} for school {}: {:?}", entry.id, school_id, reasons);
                }
                Err(error)
            }
        }
    }

    async fn delete_entry(&self, school_id: Uuid, entry_id: Uuid) -> Result<bool> {
        let removed = entries::delete_entries_by_ids(&self.pool, school_id, &[entry_id]).await?;
        Ok(removed > 0)
    }

    async fn delete_section_entries(&self, school_id: Uuid, section_ids: &[Uuid]) -> Result<u64> {
        entries::delete_entries_by_section_ids(&self.pool, school_id, section_ids).await
    }
}
