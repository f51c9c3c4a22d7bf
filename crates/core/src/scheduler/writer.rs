//! # Placement Writer
//!
//! The only path that creates or deletes timetable entries. Each write
//! validates the candidate, runs the conflict checker against a fresh
//! snapshot, and hands the store one atomic delete+insert. The store then
//! re-checks overlap itself, so a placement that raced past the advisory
//! check still fails with a conflict instead of double-booking.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    availability::{AvailabilityIndex, IndexOptions},
    conflict::{find_conflicts, is_free, reasons_of},
    grid::validate_duration,
};
use crate::{
    errors::{TimetableError, TimetableResult},
    models::{
        entry::{LessonPlacement, TimetableEntry},
        time::is_valid_day,
    },
    store::{SchoolSnapshot, TimetableStore},
};

/// Shape checks that need no stored state.
pub fn validate_placement(placement: &LessonPlacement) -> TimetableResult<()> {
    if !is_valid_day(placement.day_of_week) {
        return Err(TimetableError::Validation(format!(
            "day_of_week must be between 0 and 6, got {}",
            placement.day_of_week
        )));
    }
    if placement.end_time <= placement.start_time {
        return Err(TimetableError::Validation(format!(
            "End time {} must be after start time {}",
            placement.end_time, placement.start_time
        )));
    }
    let minutes = u32::try_from(placement.range().minutes()).unwrap_or(0);
    validate_duration(minutes)
}

/// Ids a request refers to. `None` means the request does not name one.
#[derive(Debug, Clone, Copy, Default)]
pub struct References {
    pub section_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
}

impl From<&LessonPlacement> for References {
    fn from(placement: &LessonPlacement) -> Self {
        Self {
            section_id: Some(placement.section_id),
            subject_id: Some(placement.subject_id),
            staff_id: Some(placement.staff_id),
            room_id: placement.room_id,
        }
    }
}

/// Every named id must exist in the school.
pub fn check_references(snapshot: &SchoolSnapshot, references: References) -> TimetableResult<()> {
    if let Some(section_id) = references.section_id {
        if snapshot.section(section_id).is_none() {
            return Err(TimetableError::NotFound(format!("Section with ID {} not found", section_id)));
        }
    }
    if let Some(subject_id) = references.subject_id {
        if !snapshot.has_subject(subject_id) {
            return Err(TimetableError::NotFound(format!("Subject with ID {} not found", subject_id)));
        }
    }
    if let Some(staff_id) = references.staff_id {
        if !snapshot.has_staff(staff_id) {
            return Err(TimetableError::NotFound(format!("Staff with ID {} not found", staff_id)));
        }
    }
    if let Some(room_id) = references.room_id {
        if !snapshot.has_room(room_id) {
            return Err(TimetableError::NotFound(format!("Room with ID {} not found", room_id)));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct PlacementWriter {
    store: Arc<dyn TimetableStore>,
}

impl PlacementWriter {
    pub fn new(store: Arc<dyn TimetableStore>) -> Self {
        Self { store }
    }

    /// Creates an entry, or moves `replacing` to the new placement.
    ///
    /// On conflict the call fails unless `override_conflict` is set, in which
    /// case every conflicting entry is deleted in the same transaction as the
    /// insert. Conflicts with pinned slots or unavailability windows cannot be
    /// overridden.
    pub async fn place(
        &self,
        school_id: Uuid,
        placement: LessonPlacement,
        replacing: Option<Uuid>,
        override_conflict: bool,
    ) -> TimetableResult<TimetableEntry> {
        validate_placement(&placement)?;

        let snapshot = self.store.load_snapshot(school_id).await?;
        let previous = match replacing {
            Some(id) => Some(
                snapshot
                    .entry(id)
                    .cloned()
                    .ok_or_else(|| TimetableError::NotFound(format!("Timetable entry with ID {} not found", id)))?,
            ),
            None => None,
        };
        check_references(&snapshot, References::from(&placement))?;

        let index = AvailabilityIndex::from_snapshot(&snapshot, IndexOptions::default());
        let conflicts = find_conflicts(&index, &placement.claim(), replacing);

        let mut remove: Vec<Uuid> = replacing.into_iter().collect();
        if !conflicts.is_empty() {
            let reasons = reasons_of(&conflicts);
            if !override_conflict {
                debug!("Placement rejected for school {}: {:?}", school_id, reasons);
                return Err(TimetableError::Conflict(reasons));
            }
            if reasons.iter().any(|reason| !reason.is_overridable()) {
                warn!(
                    "Override refused for school {}: blocked by pinned slot or unavailability",
                    school_id
                );
                return Err(TimetableError::Conflict(reasons));
            }

            let mut displaced: Vec<Uuid> = conflicts.iter().filter_map(|conflict| conflict.entry_id).collect();
            displaced.sort();
            displaced.dedup();
            info!(
                "Overriding {} conflicting entries in school {}",
                displaced.len(),
                school_id
            );
            remove.extend(displaced);
        }

        let created_at = previous.map_or_else(Utc::now, |entry| entry.created_at);
        let entry = placement.into_entry(replacing.unwrap_or_else(Uuid::new_v4), school_id, created_at);
        self.store.commit_placement(school_id, &remove, &entry).await?;

        debug!("Committed timetable entry {} for school {}", entry.id, school_id);
        Ok(entry)
    }

    /// Persists generated lessons one by one without overriding anything.
    ///
    /// A lesson that now overlaps a stored entry (for example one written
    /// concurrently) is skipped and reported as `None`.
    pub async fn place_planned(
        &self,
        school_id: Uuid,
        placements: &[LessonPlacement],
    ) -> TimetableResult<Vec<Option<TimetableEntry>>> {
        let snapshot = self.store.load_snapshot(school_id).await?;
        let mut index = AvailabilityIndex::from_snapshot(
            &snapshot,
            IndexOptions {
                include_pinned: false,
                honor_unavailability: false,
            },
        );

        let mut outcomes = Vec::with_capacity(placements.len());
        for placement in placements {
            if !is_free(&index, &placement.claim()) {
                warn!(
                    "Generated lesson for section {} no longer fits, skipping",
                    placement.section_id
                );
                outcomes.push(None);
                continue;
            }

            let entry = placement.clone().into_entry(Uuid::new_v4(), school_id, Utc::now());
            match self.store.commit_placement(school_id, &[], &entry).await {
                Ok(()) => {
                    index.add_entry(&entry);
                    outcomes.push(Some(entry));
                }
                Err(TimetableError::Conflict(reasons)) => {
                    warn!(
                        "Store rejected generated lesson for section {}: {:?}",
                        placement.section_id, reasons
                    );
                    outcomes.push(None);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(outcomes)
    }

    pub async fn remove(&self, school_id: Uuid, entry_id: Uuid) -> TimetableResult<()> {
        if !self.store.delete_entry(school_id, entry_id).await? {
            return Err(TimetableError::NotFound(format!(
                "Timetable entry with ID {} not found",
                entry_id
            )));
        }
        debug!("Deleted timetable entry {} for school {}", entry_id, school_id);
        Ok(())
    }

    /// Deletes every entry of the given sections.
    pub async fn clear_sections(&self, school_id: Uuid, section_ids: &[Uuid]) -> TimetableResult<u64> {
        let removed = self.store.delete_section_entries(school_id, section_ids).await?;
        info!(
            "Cleared {} entries across {} sections in school {}",
            removed,
            section_ids.len(),
            school_id
        );
        Ok(removed)
    }
}
