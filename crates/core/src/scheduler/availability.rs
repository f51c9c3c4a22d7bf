//! # Availability Index
//!
//! Request-scoped record of every occupied or forbidden window per section,
//! teacher and room. It is built from a [`SchoolSnapshot`] at the start of a
//! request and passed explicitly through the search; nothing here is shared
//! between requests.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    models::{
        constraints::{PinnedSlot, RoomUnavailability, StaffUnavailability},
        entry::{LessonPlacement, TimetableEntry},
        time::TimeRange,
    },
    store::SchoolSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Section(Uuid),
    Staff(Uuid),
    Room(Uuid),
}

/// What put a block into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSource {
    Entry(Uuid),
    Pinned(Uuid),
    Unavailable,
    /// Placed earlier in the current generation run, keyed by variable.
    Planned(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub day_of_week: u8,
    pub range: TimeRange,
    pub source: BlockSource,
}

/// Which stored constraints to load alongside existing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    pub include_pinned: bool,
    pub honor_unavailability: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            include_pinned: true,
            honor_unavailability: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    blocks: HashMap<Resource, Vec<Block>>,
}

impl AvailabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &SchoolSnapshot, options: IndexOptions) -> Self {
        let mut index = Self::new();
        for entry in &snapshot.entries {
            index.add_entry(entry);
        }
        if options.include_pinned {
            for pin in &snapshot.pinned_slots {
                index.add_pinned(pin);
            }
        }
        if options.honor_unavailability {
            for window in &snapshot.staff_unavailability {
                index.add_staff_unavailability(window);
            }
            for window in &snapshot.room_unavailability {
                index.add_room_unavailability(window);
            }
        }
        index
    }

    pub fn occupy(&mut self, resource: Resource, day_of_week: u8, range: TimeRange, source: BlockSource) {
        self.blocks.entry(resource).or_default().push(Block {
            day_of_week,
            range,
            source,
        });
    }

    pub fn add_entry(&mut self, entry: &TimetableEntry) {
        let source = BlockSource::Entry(entry.id);
        self.occupy_lesson(&entry.placement(), source);
    }

    pub fn add_planned(&mut self, variable: usize, placement: &LessonPlacement) {
        self.occupy_lesson(placement, BlockSource::Planned(variable));
    }

    pub fn add_pinned(&mut self, pin: &PinnedSlot) {
        let source = BlockSource::Pinned(pin.id);
        let range = pin.range();
        self.occupy(Resource::Section(pin.section_id), pin.day_of_week, range, source);
        if let Some(staff_id) = pin.staff_id {
            self.occupy(Resource::Staff(staff_id), pin.day_of_week, range, source);
        }
        if let Some(room_id) = pin.room_id {
            self.occupy(Resource::Room(room_id), pin.day_of_week, range, source);
        }
    }

    pub fn add_staff_unavailability(&mut self, window: &StaffUnavailability) {
        self.occupy(
            Resource::Staff(window.staff_id),
            window.day_of_week,
            window.range(),
            BlockSource::Unavailable,
        );
    }

    pub fn add_room_unavailability(&mut self, window: &RoomUnavailability) {
        self.occupy(
            Resource::Room(window.room_id),
            window.day_of_week,
            window.range(),
            BlockSource::Unavailable,
        );
    }

    /// Drops every block contributed by `source`.
    pub fn release(&mut self, source: BlockSource) {
        for blocks in self.blocks.values_mut() {
            blocks.retain(|block| block.source != source);
        }
    }

    /// Blocks of `resource` on `day_of_week` that overlap `range`.
    pub fn overlapping(
        &self,
        resource: Resource,
        day_of_week: u8,
        range: TimeRange,
    ) -> impl Iterator<Item = &Block> + '_ {
        self.blocks
            .get(&resource)
            .into_iter()
            .flatten()
            .filter(move |block| block.day_of_week == day_of_week && block.range.overlaps(&range))
    }

    fn occupy_lesson(&mut self, placement: &LessonPlacement, source: BlockSource) {
        let range = placement.range();
        let day = placement.day_of_week;
        self.occupy(Resource::Section(placement.section_id), day, range, source);
        self.occupy(Resource::Staff(placement.staff_id), day, range, source);
        if let Some(room_id) = placement.room_id {
            self.occupy(Resource::Room(room_id), day, range, source);
        }
    }
}
