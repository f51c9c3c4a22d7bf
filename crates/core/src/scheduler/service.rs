use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{
    availability::{AvailabilityIndex, IndexOptions},
    conflict::check_conflict,
    generator::plan_week,
    grid::TimeGrid,
    lock::{GenerationLocks, LockScope},
    suggest::suggest_slot,
    writer::{PlacementWriter, References, check_references},
};
use crate::{
    errors::{TimetableError, TimetableResult},
    models::{
        catalog::SchoolDay,
        conflict::{CheckConflictRequest, ConflictReason},
        entry::{EntryFilter, LessonPlacement, PlacementRequest, TimetableEntry},
        scheduling::{
            GenerateOptions, GenerationReport, SuggestRequest, SuggestedSlot, UnsatisfiedRequirement,
        },
        time::is_valid_day,
    },
    store::{SchoolSnapshot, TimetableStore},
};

/// Per-school entry point to the scheduling engine.
///
/// Cloning is cheap; clones share the store and the generation locks.
#[derive(Clone)]
pub struct TimetableService {
    store: Arc<dyn TimetableStore>,
    writer: PlacementWriter,
    locks: GenerationLocks,
    default_day: SchoolDay,
}

impl TimetableService {
    /// `default_day` applies to schools without configured hours.
    pub fn new(store: Arc<dyn TimetableStore>, default_day: SchoolDay) -> Self {
        Self {
            writer: PlacementWriter::new(store.clone()),
            store,
            locks: GenerationLocks::new(),
            default_day,
        }
    }

    pub async fn list_entries(&self, school_id: Uuid, filter: &EntryFilter) -> TimetableResult<Vec<TimetableEntry>> {
        Ok(self.store.list_entries(school_id, filter).await?)
    }

    pub async fn get_entry(&self, school_id: Uuid, entry_id: Uuid) -> TimetableResult<TimetableEntry> {
        self.store
            .find_entry(school_id, entry_id)
            .await?
            .ok_or_else(|| TimetableError::NotFound(format!("Timetable entry with ID {} not found", entry_id)))
    }

    /// Advisory check; writes nothing.
    pub async fn check_conflicts(
        &self,
        school_id: Uuid,
        request: &CheckConflictRequest,
    ) -> TimetableResult<Vec<ConflictReason>> {
        let claim = request.claim();
        if !is_valid_day(claim.day_of_week) || claim.range.is_empty() {
            return Err(TimetableError::Validation(format!(
                "Invalid candidate: day {} {}",
                claim.day_of_week, claim.range
            )));
        }
        let snapshot = self.store.load_snapshot(school_id).await?;
        check_references(
            &snapshot,
            References {
                section_id: Some(request.section_id),
                staff_id: Some(request.staff_id),
                room_id: request.room_id,
                ..References::default()
            },
        )?;
        let index = AvailabilityIndex::from_snapshot(&snapshot, IndexOptions::default());
        Ok(check_conflict(&index, &claim, request.exclude_entry_id))
    }

    pub async fn create_entry(&self, school_id: Uuid, request: PlacementRequest) -> TimetableResult<TimetableEntry> {
        self.writer
            .place(school_id, request.placement, None, request.override_conflict)
            .await
    }

    pub async fn update_entry(
        &self,
        school_id: Uuid,
        entry_id: Uuid,
        request: PlacementRequest,
    ) -> TimetableResult<TimetableEntry> {
        self.writer
            .place(school_id, request.placement, Some(entry_id), request.override_conflict)
            .await
    }

    pub async fn delete_entry(&self, school_id: Uuid, entry_id: Uuid) -> TimetableResult<()> {
        self.writer.remove(school_id, entry_id).await
    }

    pub async fn suggest(&self, school_id: Uuid, request: &SuggestRequest) -> TimetableResult<SuggestedSlot> {
        let snapshot = self.store.load_snapshot(school_id).await?;
        check_references(
            &snapshot,
            References {
                section_id: request.section_id,
                subject_id: request.subject_id,
                staff_id: request.staff_id,
                room_id: request.preferred_room_id,
            },
        )?;
        let grid = self.grid_for(&snapshot)?;
        let index = AvailabilityIndex::from_snapshot(&snapshot, IndexOptions::default());
        suggest_slot(&index, &grid, request)
    }

    /// Fills the week for the targeted sections.
    ///
    /// Fails with [`TimetableError::Busy`] while another run holds any of
    /// the same sections. Unplaceable occurrences are reported, not raised.
    pub async fn generate(&self, school_id: Uuid, options: &GenerateOptions) -> TimetableResult<GenerationReport> {
        let scope = match &options.target_section_ids {
            Some(ids) => LockScope::Sections(ids.iter().copied().collect()),
            None => LockScope::School,
        };
        let _guard = self.locks.try_acquire(school_id, scope).ok_or_else(|| {
            TimetableError::Busy(format!("School {} has a generation in progress", school_id))
        })?;

        info!("Starting timetable generation for school {}", school_id);

        let mut snapshot = self.store.load_snapshot(school_id).await?;
        if options.clear_existing {
            let sections: Vec<Uuid> = match &options.target_section_ids {
                Some(ids) => ids.clone(),
                None => snapshot.sections.iter().map(|section| section.id).collect(),
            };
            self.writer.clear_sections(school_id, &sections).await?;
            snapshot = self.store.load_snapshot(school_id).await?;
        }

        let grid = self.grid_for(&snapshot)?;
        let mut plan = plan_week(&snapshot, &grid, options)?;

        let placements: Vec<LessonPlacement> = plan
            .lessons
            .iter()
            .map(|lesson| lesson.placement.clone())
            .collect();
        let outcomes = self.writer.place_planned(school_id, &placements).await?;

        let mut created = Vec::with_capacity(outcomes.len());
        for (lesson, outcome) in plan.lessons.iter().zip(outcomes) {
            match outcome {
                Some(entry) => created.push(entry),
                None => plan.missing[lesson.requirement] += 1,
            }
        }

        let unsatisfied: Vec<UnsatisfiedRequirement> = plan
            .requirements
            .into_iter()
            .zip(plan.missing)
            .filter(|(_, missing)| *missing > 0)
            .map(|(requirement, missing)| UnsatisfiedRequirement { requirement, missing })
            .collect();

        info!(
            "Generation for school {} placed {} lessons, {} requirements unsatisfied",
            school_id,
            created.len(),
            unsatisfied.len()
        );

        Ok(GenerationReport {
            placed_count: created.len(),
            placements: created,
            unsatisfied,
        })
    }

    fn grid_for(&self, snapshot: &SchoolSnapshot) -> TimetableResult<TimeGrid> {
        TimeGrid::new(snapshot.school_day.unwrap_or(self.default_day))
    }
}
