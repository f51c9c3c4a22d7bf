//! # Conflict Checker
//!
//! Pure queries over an [`AvailabilityIndex`]. Every applicable reason is
//! reported; the checker never stops at the first hit.

use uuid::Uuid;

use super::availability::{AvailabilityIndex, BlockSource, Resource};
use crate::models::conflict::{Conflict, ConflictReason, SlotClaim};

/// Lists every blocker of `claim`, one item per overlapping block.
///
/// Blocks belonging to `exclude_entry_id` are ignored so an edit does not
/// collide with its own previous placement.
pub fn find_conflicts(
    index: &AvailabilityIndex,
    claim: &SlotClaim,
    exclude_entry_id: Option<Uuid>,
) -> Vec<Conflict> {
    let resources = [
        claim.section_id.map(Resource::Section),
        claim.staff_id.map(Resource::Staff),
        claim.room_id.map(Resource::Room),
    ];

    let mut conflicts = Vec::new();
    for resource in resources.into_iter().flatten() {
        for block in index.overlapping(resource, claim.day_of_week, claim.range) {
            let entry_id = match block.source {
                BlockSource::Entry(id) if Some(id) == exclude_entry_id => continue,
                BlockSource::Entry(id) => Some(id),
                _ => None,
            };
            conflicts.push(Conflict {
                reason: reason_for(resource, block.source),
                entry_id,
            });
        }
    }
    conflicts
}

/// Distinct reasons `claim` cannot be placed, in a fixed order.
pub fn check_conflict(
    index: &AvailabilityIndex,
    claim: &SlotClaim,
    exclude_entry_id: Option<Uuid>,
) -> Vec<ConflictReason> {
    reasons_of(&find_conflicts(index, claim, exclude_entry_id))
}

pub fn reasons_of(conflicts: &[Conflict]) -> Vec<ConflictReason> {
    let mut reasons: Vec<ConflictReason> = conflicts.iter().map(|conflict| conflict.reason).collect();
    reasons.sort();
    reasons.dedup();
    reasons
}

/// True when nothing in the index blocks `claim`.
pub fn is_free(index: &AvailabilityIndex, claim: &SlotClaim) -> bool {
    let resources = [
        claim.section_id.map(Resource::Section),
        claim.staff_id.map(Resource::Staff),
        claim.room_id.map(Resource::Room),
    ];
    resources
        .into_iter()
        .flatten()
        .all(|resource| index.overlapping(resource, claim.day_of_week, claim.range).next().is_none())
}

fn reason_for(resource: Resource, source: BlockSource) -> ConflictReason {
    match (resource, source) {
        (_, BlockSource::Pinned(_)) => ConflictReason::PinnedConflict,
        (Resource::Staff(_), BlockSource::Unavailable) => ConflictReason::StaffUnavailable,
        (Resource::Room(_), BlockSource::Unavailable) => ConflictReason::RoomUnavailable,
        (Resource::Section(_), _) => ConflictReason::SectionBusy,
        (Resource::Staff(_), _) => ConflictReason::StaffBusy,
        (Resource::Room(_), _) => ConflictReason::RoomBusy,
    }
}
