#![allow(dead_code)]

use chrono::{NaiveTime, Utc};
use fake::{Fake, faker::name::en::Name};
use timetabler_core::{
    models::{
        catalog::{Room, SchoolDay, Section, Staff, StaffEligibility, Subject},
        constraints::{PinnedSlot, Requirement, RoomUnavailability, StaffUnavailability},
        entry::{LessonPlacement, TimetableEntry},
    },
    store::SchoolSnapshot,
};
use uuid::Uuid;

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

/// Builds a school's stored state piece by piece.
pub struct SchoolBuilder {
    snapshot: SchoolSnapshot,
    level_id: Uuid,
}

impl SchoolBuilder {
    /// A school open 08:00 to 17:00 with a single level.
    pub fn new() -> Self {
        let school_id = Uuid::new_v4();
        Self {
            snapshot: SchoolSnapshot {
                school_id,
                school_day: Some(SchoolDay {
                    start_time: time(8, 0),
                    end_time: time(17, 0),
                }),
                ..SchoolSnapshot::default()
            },
            level_id: Uuid::new_v4(),
        }
    }

    pub fn school_id(&self) -> Uuid {
        self.snapshot.school_id
    }

    pub fn level_id(&self) -> Uuid {
        self.level_id
    }

    pub fn hours(&mut self, start: NaiveTime, end: NaiveTime) -> &mut Self {
        self.snapshot.school_day = Some(SchoolDay {
            start_time: start,
            end_time: end,
        });
        self
    }

    pub fn section(&mut self, name: &str) -> Uuid {
        let level_id = self.level_id;
        self.section_at_level(name, level_id)
    }

    pub fn section_at_level(&mut self, name: &str, level_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.sections.push(Section {
            id,
            school_id: self.school_id(),
            name: name.to_string(),
            level_id,
        });
        id
    }

    pub fn subject(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.subjects.push(Subject {
            id,
            school_id: self.school_id(),
            name: name.to_string(),
        });
        id
    }

    /// A teacher eligible for `subjects` at every level.
    pub fn teacher(&mut self, subjects: &[Uuid]) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.staff.push(Staff {
            id,
            school_id: self.school_id(),
            name: Name().fake(),
        });
        for &subject_id in subjects {
            self.snapshot.eligibility.push(StaffEligibility {
                staff_id: id,
                subject_id,
                level_id: None,
            });
        }
        id
    }

    pub fn eligible_at(&mut self, staff_id: Uuid, subject_id: Uuid, level_id: Uuid) -> &mut Self {
        self.snapshot.eligibility.push(StaffEligibility {
            staff_id,
            subject_id,
            level_id: Some(level_id),
        });
        self
    }

    pub fn room(&mut self, name: &str, room_type: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.rooms.push(Room {
            id,
            school_id: self.school_id(),
            name: name.to_string(),
            room_type: room_type.map(str::to_string),
        });
        id
    }

    pub fn requirement(&mut self, section_id: Uuid, subject_id: Uuid, periods: u32, minutes: u32) -> &mut Requirement {
        self.snapshot.requirements.push(Requirement {
            id: Uuid::new_v4(),
            school_id: self.school_id(),
            section_id,
            subject_id,
            periods_per_week: periods,
            duration_minutes: minutes,
            min_gap_mins: 0,
            allow_double: false,
            preferred_room_type: None,
            staff_id: None,
        });
        self.snapshot.requirements.last_mut().expect("just pushed")
    }

    #[allow(clippy::too_many_arguments)]
    pub fn pin(
        &mut self,
        section_id: Uuid,
        subject_id: Uuid,
        staff_id: Option<Uuid>,
        room_id: Option<Uuid>,
        day: u8,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.pinned_slots.push(PinnedSlot {
            id,
            school_id: self.school_id(),
            section_id,
            subject_id,
            staff_id,
            room_id,
            day_of_week: day,
            start_time: start,
            end_time: end,
        });
        id
    }

    pub fn staff_unavailable(&mut self, staff_id: Uuid, day: u8, start: NaiveTime, end: NaiveTime) -> &mut Self {
        self.snapshot.staff_unavailability.push(StaffUnavailability {
            id: Uuid::new_v4(),
            school_id: self.school_id(),
            staff_id,
            day_of_week: day,
            start_time: start,
            end_time: end,
        });
        self
    }

    pub fn room_unavailable(&mut self, room_id: Uuid, day: u8, start: NaiveTime, end: NaiveTime) -> &mut Self {
        self.snapshot.room_unavailability.push(RoomUnavailability {
            id: Uuid::new_v4(),
            school_id: self.school_id(),
            room_id,
            day_of_week: day,
            start_time: start,
            end_time: end,
        });
        self
    }

    pub fn entry(&mut self, placement: LessonPlacement) -> Uuid {
        let id = Uuid::new_v4();
        let entry = placement.into_entry(id, self.school_id(), Utc::now());
        self.snapshot.entries.push(entry);
        id
    }

    pub fn build(&self) -> SchoolSnapshot {
        self.snapshot.clone()
    }
}

#[allow(clippy::too_many_arguments)]
pub fn lesson(
    section_id: Uuid,
    subject_id: Uuid,
    staff_id: Uuid,
    room_id: Option<Uuid>,
    day: u8,
    start: NaiveTime,
    end: NaiveTime,
) -> LessonPlacement {
    LessonPlacement {
        section_id,
        subject_id,
        staff_id,
        room_id,
        day_of_week: day,
        start_time: start,
        end_time: end,
    }
}

/// Panics if any two entries share a section, teacher or room and overlap on the same day.
pub fn assert_no_overlaps(entries: &[TimetableEntry]) {
    for (i, a) in entries.iter().enumerate() {
        for b in &entries[i + 1..] {
            if a.day_of_week != b.day_of_week || !a.range().overlaps(&b.range()) {
                continue;
            }
            assert_ne!(a.section_id, b.section_id, "section double-booked: {:?} / {:?}", a, b);
            assert_ne!(a.staff_id, b.staff_id, "teacher double-booked: {:?} / {:?}", a, b);
            if a.room_id.is_some() {
                assert_ne!(a.room_id, b.room_id, "room double-booked: {:?} / {:?}", a, b);
            }
        }
    }
}
