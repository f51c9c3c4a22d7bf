//! Advisory locks that keep two generation runs off the same sections.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;
use uuid::Uuid;

/// What a generation run holds within one school.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockScope {
    School,
    Sections(BTreeSet<Uuid>),
}

impl LockScope {
    pub fn overlaps(&self, other: &LockScope) -> bool {
        match (self, other) {
            (LockScope::School, _) | (_, LockScope::School) => true,
            (LockScope::Sections(a), LockScope::Sections(b)) => !a.is_disjoint(b),
        }
    }
}

#[derive(Debug, Default)]
struct Registry {
    held: HashMap<Uuid, Vec<(u64, LockScope)>>,
}

/// In-process registry of running generations, shared by clones.
#[derive(Debug, Clone, Default)]
pub struct GenerationLocks {
    registry: Arc<Mutex<Registry>>,
    tickets: Arc<AtomicU64>,
}

impl GenerationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the scope, or returns `None` if an overlapping run holds it.
    pub fn try_acquire(&self, school_id: Uuid, scope: LockScope) -> Option<GenerationGuard> {
        let mut registry = self.registry.lock();
        let held = registry.held.entry(school_id).or_default();
        if held.iter().any(|(_, existing)| existing.overlaps(&scope)) {
            return None;
        }

        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed);
        held.push((ticket, scope));
        Some(GenerationGuard {
            locks: self.clone(),
            school_id,
            ticket,
        })
    }

    fn release(&self, school_id: Uuid, ticket: u64) {
        let mut registry = self.registry.lock();
        if let Some(held) = registry.held.get_mut(&school_id) {
            held.retain(|(held_ticket, _)| *held_ticket != ticket);
            if held.is_empty() {
                registry.held.remove(&school_id);
            }
        }
    }
}

/// Releases its scope when dropped.
#[derive(Debug)]
pub struct GenerationGuard {
    locks: GenerationLocks,
    school_id: Uuid,
    ticket: u64,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.locks.release(self.school_id, self.ticket);
    }
}
