//! # Slot Suggester
//!
//! Linear, deterministic search over the time grid: days in the given order,
//! then start times ascending. The first acceptable candidate wins, so the
//! same state and criteria always produce the same slot.

use super::{
    availability::AvailabilityIndex,
    conflict::is_free,
    grid::{TimeGrid, validate_duration},
};
use crate::{
    errors::{TimetableError, TimetableResult},
    models::{
        conflict::SlotClaim,
        scheduling::{SuggestRequest, SuggestedSlot},
        time::{TimeRange, is_valid_day},
    },
};

/// Walks `(day, range)` candidates in search order and returns the first one
/// `accept` turns into a value.
pub fn first_fit<T, F>(
    grid: &TimeGrid,
    days: &[u8],
    duration_minutes: u32,
    window: Option<TimeRange>,
    mut accept: F,
) -> Option<T>
where
    F: FnMut(u8, TimeRange) -> Option<T>,
{
    let candidates = grid.candidates(duration_minutes, window);
    days.iter()
        .flat_map(|&day| candidates.iter().map(move |&range| (day, range)))
        .find_map(|(day, range)| accept(day, range))
}

/// Finds the earliest slot free for the requested section, teacher and room.
///
/// Only `preferred_room_id` is tried as a room; without it the lesson is
/// treated as room-less and room occupancy is not consulted.
pub fn suggest_slot(
    index: &AvailabilityIndex,
    grid: &TimeGrid,
    request: &SuggestRequest,
) -> TimetableResult<SuggestedSlot> {
    validate_duration(request.duration_minutes)?;

    let days: Vec<u8> = match request.day_of_week {
        Some(day) if !is_valid_day(day) => {
            return Err(TimetableError::Validation(format!(
                "day_of_week must be between 0 and 6, got {}",
                day
            )));
        }
        Some(day) => vec![day],
        None => grid.days().collect(),
    };

    first_fit(grid, &days, request.duration_minutes, None, |day, range| {
        let claim = SlotClaim {
            section_id: request.section_id,
            staff_id: request.staff_id,
            room_id: request.preferred_room_id,
            day_of_week: day,
            range,
        };
        is_free(index, &claim).then_some(SuggestedSlot {
            day_of_week: day,
            start_time: range.start,
            end_time: range.end,
            room_id: request.preferred_room_id,
        })
    })
    .ok_or(TimetableError::NoSlotAvailable)
}
