//! # Weekly Generator
//!
//! Best-effort constraint satisfaction over a school's period requirements.
//!
//! Each requirement expands into one variable per missing weekly occurrence.
//! Variables are placed most-constrained first (fewest staff × room × slot
//! combinations), ties broken by requirement order. A variable takes the first
//! slot the suggester search finds for its earliest-listed eligible teacher,
//! looking inside the preferred window before the full day. When a variable
//! cannot be placed, up to [`BACKTRACK_LIMIT`] recent placements that block it
//! (same section or teacher, or a room when rooms are the bottleneck) are
//! lifted, the variable is retried and the lifted lessons are placed again. If that single pass fails the previous state is
//! restored and the occurrence is reported missing.
//!
//! The search is pure: it plans against an in-memory [`AvailabilityIndex`]
//! and leaves persistence to the placement writer.

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    availability::{AvailabilityIndex, BlockSource, IndexOptions},
    conflict::is_free,
    grid::{TimeGrid, validate_duration},
    suggest::first_fit,
};
use crate::{
    errors::{TimetableError, TimetableResult},
    models::{
        conflict::SlotClaim,
        constraints::Requirement,
        entry::LessonPlacement,
        scheduling::GenerateOptions,
        time::{TimeRange, day_name},
    },
    store::SchoolSnapshot,
};

/// Most placements lifted while retrying one failing variable.
pub const BACKTRACK_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLesson {
    /// Index into [`WeekPlan::requirements`].
    pub requirement: usize,
    pub placement: LessonPlacement,
}

/// Outcome of a planning run, before anything is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekPlan {
    /// Requirements of the targeted sections, in stored order.
    pub requirements: Vec<Requirement>,
    pub lessons: Vec<PlannedLesson>,
    /// Occurrences left unplaced, parallel to `requirements`.
    pub missing: Vec<u32>,
}

/// Resolves the soft time window from the options, clipped to the school day.
///
/// A window with its end at or before its start is invalid. A window that
/// misses the school day entirely is dropped and the full day is used.
pub fn preferred_window(grid: &TimeGrid, options: &GenerateOptions) -> TimetableResult<Option<TimeRange>> {
    if let (Some(start), Some(end)) = (options.preferred_start_time, options.preferred_end_time) {
        if end <= start {
            return Err(TimetableError::Validation(format!(
                "Preferred end time {} must be after preferred start time {}",
                end, start
            )));
        }
    }
    if options.preferred_start_time.is_none() && options.preferred_end_time.is_none() {
        return Ok(None);
    }
    let day = grid.school_day();
    let window = TimeRange::new(
        options.preferred_start_time.unwrap_or(day.start_time).max(day.start_time),
        options.preferred_end_time.unwrap_or(day.end_time).min(day.end_time),
    );
    if window.is_empty() {
        warn!(
            "Preferred window {} - {} lies outside the school day {} - {}, using the full day",
            options.preferred_start_time.unwrap_or(day.start_time),
            options.preferred_end_time.unwrap_or(day.end_time),
            day.start_time,
            day.end_time
        );
        return Ok(None);
    }
    Ok(Some(window))
}

/// Plans lessons for every unmet requirement of the targeted sections.
pub fn plan_week(
    snapshot: &SchoolSnapshot,
    grid: &TimeGrid,
    options: &GenerateOptions,
) -> TimetableResult<WeekPlan> {
    if let Some(targets) = &options.target_section_ids {
        if let Some(unknown) = targets.iter().find(|id| snapshot.section(**id).is_none()) {
            return Err(TimetableError::NotFound(format!(
                "Section with ID {} not found",
                unknown
            )));
        }
    }
    let window = preferred_window(grid, options)?;

    let requirements: Vec<Requirement> = snapshot
        .requirements
        .iter()
        .filter(|requirement| {
            options
                .target_section_ids
                .as_ref()
                .is_none_or(|targets| targets.contains(&requirement.section_id))
        })
        .cloned()
        .collect();

    let mut planner = Planner::new(snapshot, grid, &requirements, options, window);
    planner.run();
    Ok(planner.into_plan())
}

#[derive(Debug, Clone)]
struct Variable {
    requirement: usize,
    staff: Vec<Uuid>,
    rooms: Vec<Option<Uuid>>,
    domain: usize,
}

#[derive(Debug, Clone, Copy)]
struct Occurrence {
    day_of_week: u8,
    range: TimeRange,
    variable: Option<usize>,
}

struct Planner<'a> {
    grid: &'a TimeGrid,
    requirements: &'a [Requirement],
    windows: Vec<Option<TimeRange>>,
    variables: Vec<Variable>,
    missing: Vec<u32>,
    index: AvailabilityIndex,
    occurrences: HashMap<(Uuid, Uuid), Vec<Occurrence>>,
    assigned: Vec<Option<LessonPlacement>>,
    log: Vec<usize>,
}

impl<'a> Planner<'a> {
    fn new(
        snapshot: &SchoolSnapshot,
        grid: &'a TimeGrid,
        requirements: &'a [Requirement],
        options: &GenerateOptions,
        window: Option<TimeRange>,
    ) -> Self {
        let index = AvailabilityIndex::from_snapshot(
            snapshot,
            IndexOptions {
                include_pinned: options.include_pinned,
                honor_unavailability: options.honor_unavailability,
            },
        );

        let mut occurrences: HashMap<(Uuid, Uuid), Vec<Occurrence>> = HashMap::new();
        for entry in &snapshot.entries {
            occurrences
                .entry((entry.section_id, entry.subject_id))
                .or_default()
                .push(Occurrence {
                    day_of_week: entry.day_of_week,
                    range: entry.range(),
                    variable: None,
                });
        }
        if options.include_pinned {
            for pin in &snapshot.pinned_slots {
                occurrences
                    .entry((pin.section_id, pin.subject_id))
                    .or_default()
                    .push(Occurrence {
                        day_of_week: pin.day_of_week,
                        range: pin.range(),
                        variable: None,
                    });
            }
        }

        let mut windows = Vec::new();
        if window.is_some() {
            windows.push(window);
        }
        windows.push(None);

        let mut missing = vec![0; requirements.len()];
        let mut variables = Vec::new();
        for (position, requirement) in requirements.iter().enumerate() {
            let remaining = remaining_periods(snapshot, requirement, options);
            if remaining == 0 {
                continue;
            }
            if let Err(err) = validate_duration(requirement.duration_minutes) {
                warn!("Skipping requirement {}: {}", requirement.id, err);
                missing[position] = remaining;
                continue;
            }
            let Some(section) = snapshot.section(requirement.section_id) else {
                warn!(
                    "Skipping requirement {}: section {} not found",
                    requirement.id, requirement.section_id
                );
                missing[position] = remaining;
                continue;
            };

            let staff = eligible_staff(snapshot, requirement, section.level_id);
            let rooms = candidate_rooms(snapshot, requirement);
            let slots = match grid.candidates(requirement.duration_minutes, window).len() {
                0 => grid.candidates(requirement.duration_minutes, None).len(),
                n => n,
            };
            let domain = staff.len() * rooms.len() * slots * grid.days().count();

            for _ in 0..remaining {
                variables.push(Variable {
                    requirement: position,
                    staff: staff.clone(),
                    rooms: rooms.clone(),
                    domain,
                });
            }
        }

        let assigned = vec![None; variables.len()];
        Self {
            grid,
            requirements,
            windows,
            variables,
            missing,
            index,
            occurrences,
            assigned,
            log: Vec::new(),
        }
    }

    fn run(&mut self) {
        let mut order: Vec<usize> = (0..self.variables.len()).collect();
        // Stable: equal domains keep requirement order.
        order.sort_by_key(|&variable| self.variables[variable].domain);

        for variable in order {
            if let Some(placement) = self.search(variable) {
                self.commit(variable, placement);
                continue;
            }
            if self.backtrack(variable) {
                continue;
            }
            let requirement = &self.requirements[self.variables[variable].requirement];
            warn!(
                "No slot for requirement {} (section {}, subject {})",
                requirement.id, requirement.section_id, requirement.subject_id
            );
            self.missing[self.variables[variable].requirement] += 1;
        }
    }

    fn into_plan(self) -> WeekPlan {
        let lessons = self
            .assigned
            .into_iter()
            .zip(&self.variables)
            .filter_map(|(placement, variable)| {
                placement.map(|placement| PlannedLesson {
                    requirement: variable.requirement,
                    placement,
                })
            })
            .collect();
        WeekPlan {
            requirements: self.requirements.to_vec(),
            lessons,
            missing: self.missing,
        }
    }

    /// First placement for `variable`: preferred window before full day,
    /// teachers in listing order, then days, start times and rooms.
    fn search(&self, variable: usize) -> Option<LessonPlacement> {
        self.search_in(variable, &self.variables[variable].rooms)
    }

    fn search_in(&self, variable: usize, rooms: &[Option<Uuid>]) -> Option<LessonPlacement> {
        let candidate = &self.variables[variable];
        let requirement = &self.requirements[candidate.requirement];
        let days = self.day_order(requirement);

        for window in &self.windows {
            for &staff_id in &candidate.staff {
                let found = first_fit(
                    self.grid,
                    &days,
                    requirement.duration_minutes,
                    *window,
                    |day, range| {
                        if !self.respects_spacing(requirement, day, range) {
                            return None;
                        }
                        rooms.iter().find_map(|&room_id| {
                            let claim = SlotClaim {
                                section_id: Some(requirement.section_id),
                                staff_id: Some(staff_id),
                                room_id,
                                day_of_week: day,
                                range,
                            };
                            is_free(&self.index, &claim).then_some(LessonPlacement {
                                section_id: requirement.section_id,
                                subject_id: requirement.subject_id,
                                staff_id,
                                room_id,
                                day_of_week: day,
                                start_time: range.start,
                                end_time: range.end,
                            })
                        })
                    },
                );
                if found.is_some() {
                    return found;
                }
            }
        }
        None
    }

    /// Lifts recent placements that block the variable, places it, then
    /// re-places what was lifted.
    ///
    /// Placements holding the variable's section or one of its teachers come
    /// first. Placements that only hold a room are considered when the rooms
    /// are what blocks the search, that is when a room-less search succeeds.
    fn backtrack(&mut self, variable: usize) -> bool {
        let room_bound = self.search_in(variable, &[None]).is_some();
        let recent: Vec<usize> = self.log.iter().rev().copied().collect();
        let mut contended: Vec<usize> = recent
            .iter()
            .copied()
            .filter(|&other| self.holds_section_or_staff(other, variable))
            .collect();
        if room_bound {
            let room_only: Vec<usize> = recent
                .iter()
                .copied()
                .filter(|&other| !contended.contains(&other) && self.holds_room(other, variable))
                .collect();
            contended.extend(room_only);
        }
        contended.truncate(BACKTRACK_LIMIT);
        if contended.is_empty() {
            return false;
        }

        // Most recent first.
        let lifted: Vec<(usize, LessonPlacement)> = contended
            .iter()
            .filter_map(|&other| self.unassign(other).map(|placement| (other, placement)))
            .collect();

        let Some(placement) = self.search(variable) else {
            self.restore(&lifted);
            return false;
        };
        self.commit(variable, placement);

        let mut replaced = Vec::new();
        for &(other, _) in lifted.iter().rev() {
            match self.search(other) {
                Some(placement) => {
                    self.commit(other, placement);
                    replaced.push(other);
                }
                None => {
                    for other in replaced {
                        self.unassign(other);
                    }
                    self.unassign(variable);
                    self.restore(&lifted);
                    return false;
                }
            }
        }

        debug!(
            "Backtracking placed variable {} after lifting {} lessons",
            variable,
            lifted.len()
        );
        true
    }

    fn restore(&mut self, lifted: &[(usize, LessonPlacement)]) {
        for (other, placement) in lifted.iter().rev() {
            self.commit(*other, placement.clone());
        }
    }

    fn holds_section_or_staff(&self, placed: usize, variable: usize) -> bool {
        let Some(placement) = &self.assigned[placed] else {
            return false;
        };
        let candidate = &self.variables[variable];
        placement.section_id == self.requirements[candidate.requirement].section_id
            || candidate.staff.contains(&placement.staff_id)
    }

    fn holds_room(&self, placed: usize, variable: usize) -> bool {
        let Some(placement) = &self.assigned[placed] else {
            return false;
        };
        placement.room_id.is_some() && self.variables[variable].rooms.contains(&placement.room_id)
    }

    fn commit(&mut self, variable: usize, placement: LessonPlacement) {
        debug!(
            "Planned section {} subject {} on {} {}",
            placement.section_id,
            placement.subject_id,
            day_name(placement.day_of_week),
            placement.range()
        );
        self.index.add_planned(variable, &placement);
        self.occurrences
            .entry((placement.section_id, placement.subject_id))
            .or_default()
            .push(Occurrence {
                day_of_week: placement.day_of_week,
                range: placement.range(),
                variable: Some(variable),
            });
        self.assigned[variable] = Some(placement);
        self.log.push(variable);
    }

    fn unassign(&mut self, variable: usize) -> Option<LessonPlacement> {
        let placement = self.assigned[variable].take()?;
        self.index.release(BlockSource::Planned(variable));
        if let Some(list) = self
            .occurrences
            .get_mut(&(placement.section_id, placement.subject_id))
        {
            list.retain(|occurrence| occurrence.variable != Some(variable));
        }
        self.log.retain(|&logged| logged != variable);
        Some(placement)
    }

    fn same_day(&self, requirement: &Requirement, day_of_week: u8) -> Vec<TimeRange> {
        self.occurrences
            .get(&(requirement.section_id, requirement.subject_id))
            .into_iter()
            .flatten()
            .filter(|occurrence| occurrence.day_of_week == day_of_week)
            .map(|occurrence| occurrence.range)
            .collect()
    }

    /// Days with fewer lessons of this subject first, Monday first on ties.
    fn day_order(&self, requirement: &Requirement) -> Vec<u8> {
        let mut days: Vec<u8> = self.grid.days().collect();
        days.sort_by_key(|&day| self.same_day(requirement, day).len());
        days
    }

    /// Same-day spacing: gaps below `min_gap_mins` are refused, and touching
    /// lessons are allowed only as the single double period of the day.
    fn respects_spacing(&self, requirement: &Requirement, day_of_week: u8, range: TimeRange) -> bool {
        let same_day = self.same_day(requirement, day_of_week);
        let min_gap = i64::from(requirement.min_gap_mins);

        let mut touching = 0;
        for existing in &same_day {
            match range.gap_to(existing) {
                None => return false,
                Some(0) => touching += 1,
                Some(gap) if gap < min_gap => return false,
                Some(_) => {}
            }
        }
        if touching == 0 {
            return true;
        }

        let doubles = same_day
            .iter()
            .enumerate()
            .flat_map(|(i, a)| same_day[i + 1..].iter().map(move |b| (a, b)))
            .filter(|(a, b)| a.gap_to(b) == Some(0))
            .count();
        requirement.allow_double && touching == 1 && doubles == 0
    }
}

/// Occurrences still to place once stored lessons are counted.
fn remaining_periods(snapshot: &SchoolSnapshot, requirement: &Requirement, options: &GenerateOptions) -> u32 {
    let scheduled = snapshot
        .entries
        .iter()
        .filter(|entry| entry.section_id == requirement.section_id && entry.subject_id == requirement.subject_id)
        .count();
    let pinned = if options.include_pinned && options.count_pinned {
        snapshot
            .pinned_slots
            .iter()
            .filter(|pin| pin.section_id == requirement.section_id && pin.subject_id == requirement.subject_id)
            .count()
    } else {
        0
    };
    let covered = u32::try_from(scheduled + pinned).unwrap_or(u32::MAX);
    requirement.periods_per_week.saturating_sub(covered)
}

fn eligible_staff(snapshot: &SchoolSnapshot, requirement: &Requirement, level_id: Uuid) -> Vec<Uuid> {
    if let Some(staff_id) = requirement.staff_id {
        return if snapshot.has_staff(staff_id) {
            vec![staff_id]
        } else {
            Vec::new()
        };
    }
    snapshot
        .staff
        .iter()
        .filter(|staff| {
            snapshot
                .eligibility
                .iter()
                .any(|link| link.staff_id == staff.id && link.covers(requirement.subject_id, level_id))
        })
        .map(|staff| staff.id)
        .collect()
}

/// Rooms matching the preferred type first, then the rest. A school without
/// rooms schedules room-less lessons.
fn candidate_rooms(snapshot: &SchoolSnapshot, requirement: &Requirement) -> Vec<Option<Uuid>> {
    if snapshot.rooms.is_empty() {
        return vec![None];
    }
    let mut rooms: Vec<_> = snapshot.rooms.iter().collect();
    if let Some(preferred) = &requirement.preferred_room_type {
        rooms.sort_by_key(|room| room.room_type.as_deref() != Some(preferred.as_str()));
    }
    rooms.into_iter().map(|room| Some(room.id)).collect()
}
