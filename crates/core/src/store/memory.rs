//! In-process store keeping each school's state behind one lock.
//!
//! Used by tests and by deployments that do not need persistence. The overlap
//! re-check and the delete+insert of a commit happen under the same write
//! lock, which gives it the same guarantee the database constraints give.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{SchoolSnapshot, TimetableStore};
use crate::{
    errors::{TimetableError, TimetableResult},
    models::entry::{EntryFilter, TimetableEntry},
    scheduler::{availability::AvailabilityIndex, conflict::check_conflict},
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    schools: RwLock<HashMap<Uuid, SchoolSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored state of `snapshot.school_id`.
    pub fn insert_school(&self, snapshot: SchoolSnapshot) {
        self.schools.write().insert(snapshot.school_id, snapshot);
    }

    pub fn entries(&self, school_id: Uuid) -> Vec<TimetableEntry> {
        self.schools
            .read()
            .get(&school_id)
            .map(|school| school.entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TimetableStore for MemoryStore {
    async fn load_snapshot(&self, school_id: Uuid) -> eyre::Result<SchoolSnapshot> {
        Ok(self
            .schools
            .read()
            .get(&school_id)
            .cloned()
            .unwrap_or_else(|| SchoolSnapshot {
                school_id,
                ..SchoolSnapshot::default()
            }))
    }

    async fn find_entry(&self, school_id: Uuid, entry_id: Uuid) -> eyre::Result<Option<TimetableEntry>> {
        Ok(self
            .schools
            .read()
            .get(&school_id)
            .and_then(|school| school.entry(entry_id).cloned()))
    }

    async fn list_entries(&self, school_id: Uuid, filter: &EntryFilter) -> eyre::Result<Vec<TimetableEntry>> {
        let mut entries: Vec<TimetableEntry> = self
            .entries(school_id)
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect();
        entries.sort_by_key(|entry| (entry.day_of_week, entry.start_time, entry.id));
        Ok(entries)
    }

    async fn commit_placement(
        &self,
        school_id: Uuid,
        remove: &[Uuid],
        entry: &TimetableEntry,
    ) -> TimetableResult<()> {
        let mut schools = self.schools.write();
        let school = schools.entry(school_id).or_insert_with(|| SchoolSnapshot {
            school_id,
            ..SchoolSnapshot::default()
        });

        let survives = |existing: &TimetableEntry| !remove.contains(&existing.id) && existing.id != entry.id;

        let mut index = AvailabilityIndex::new();
        for existing in school.entries.iter().filter(|existing| survives(*existing)) {
            index.add_entry(existing);
        }
        let reasons = check_conflict(&index, &entry.placement().claim(), None);
        if !reasons.is_empty() {
            return Err(TimetableError::Conflict(reasons));
        }

        school.entries.retain(|existing| survives(existing));
        school.entries.push(entry.clone());
        Ok(())
    }

    async fn delete_entry(&self, school_id: Uuid, entry_id: Uuid) -> eyre::Result<bool> {
        let mut schools = self.schools.write();
        let Some(school) = schools.get_mut(&school_id) else {
            return Ok(false);
        };
        let before = school.entries.len();
        school.entries.retain(|entry| entry.id != entry_id);
        Ok(school.entries.len() < before)
    }

    async fn delete_section_entries(&self, school_id: Uuid, section_ids: &[Uuid]) -> eyre::Result<u64> {
        let mut schools = self.schools.write();
        let Some(school) = schools.get_mut(&school_id) else {
            return Ok(0);
        };
        let before = school.entries.len();
        school.entries.retain(|entry| !section_ids.contains(&entry.section_id));
        Ok((before - school.entries.len()) as u64)
    }
}
