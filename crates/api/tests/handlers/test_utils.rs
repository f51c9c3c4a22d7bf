#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use chrono::NaiveTime;
use fake::{Fake, faker::name::en::Name};
use serde_json::{Value, json};
use timetabler_api::{ApiState, app};
use timetabler_core::{
    models::{
        catalog::{Room, SchoolDay, Section, Staff, StaffEligibility, Subject},
        constraints::{PinnedSlot, Requirement},
    },
    scheduler::TimetableService,
    store::{SchoolSnapshot, TimetableStore, memory::MemoryStore},
};
use uuid::Uuid;

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

/// A small school served over HTTP from an in-memory store: one section,
/// one subject, one teacher and one room, open 08:00 to 17:00.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub school_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub staff_id: Uuid,
    pub room_id: Uuid,
    snapshot: SchoolSnapshot,
}

impl TestContext {
    pub fn new() -> Self {
        let school_id = Uuid::new_v4();
        let level_id = Uuid::new_v4();
        let section_id = Uuid::new_v4();
        let subject_id = Uuid::new_v4();
        let staff_id = Uuid::new_v4();
        let room_id = Uuid::new_v4();

        let snapshot = SchoolSnapshot {
            school_id,
            school_day: Some(SchoolDay {
                start_time: time(8, 0),
                end_time: time(17, 0),
            }),
            sections: vec![Section {
                id: section_id,
                school_id,
                name: "7A".to_string(),
                level_id,
            }],
            subjects: vec![Subject {
                id: subject_id,
                school_id,
                name: "Mathematics".to_string(),
            }],
            staff: vec![Staff {
                id: staff_id,
                school_id,
                name: Name().fake(),
            }],
            eligibility: vec![StaffEligibility {
                staff_id,
                subject_id,
                level_id: None,
            }],
            rooms: vec![Room {
                id: room_id,
                school_id,
                name: "R1".to_string(),
                room_type: None,
            }],
            ..SchoolSnapshot::default()
        };

        Self {
            store: Arc::new(MemoryStore::new()),
            school_id,
            section_id,
            subject_id,
            staff_id,
            room_id,
            snapshot,
        }
    }

    /// Adds a second section taught by the same teacher.
    pub fn add_section(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        let level_id = self.snapshot.sections[0].level_id;
        self.snapshot.sections.push(Section {
            id,
            school_id: self.school_id,
            name: name.to_string(),
            level_id,
        });
        id
    }

    pub fn add_requirement(&mut self, section_id: Uuid, periods: u32, minutes: u32) {
        self.snapshot.requirements.push(Requirement {
            id: Uuid::new_v4(),
            school_id: self.school_id,
            section_id,
            subject_id: self.subject_id,
            periods_per_week: periods,
            duration_minutes: minutes,
            min_gap_mins: 0,
            allow_double: false,
            preferred_room_type: None,
            staff_id: None,
        });
    }

    pub fn pin(&mut self, day: u8, start: NaiveTime, end: NaiveTime) {
        self.snapshot.pinned_slots.push(PinnedSlot {
            id: Uuid::new_v4(),
            school_id: self.school_id,
            section_id: self.section_id,
            subject_id: self.subject_id,
            staff_id: Some(self.staff_id),
            room_id: None,
            day_of_week: day,
            start_time: start,
            end_time: end,
        });
    }

    /// Loads the school into the store and serves the full router over it.
    pub fn server(&self) -> TestServer {
        self.store.insert_school(self.snapshot.clone());
        test_server(self.store.clone())
    }

    pub fn timetable_path(&self) -> String {
        format!("/api/schools/{}/timetable", self.school_id)
    }

    /// Create/update body for the fixture's section, subject and teacher.
    pub fn placement(&self, room_id: Option<Uuid>, day: u8, start: &str, end: &str) -> Value {
        json!({
            "section_id": self.section_id,
            "subject_id": self.subject_id,
            "staff_id": self.staff_id,
            "room_id": room_id,
            "day_of_week": day,
            "start_time": start,
            "end_time": end,
        })
    }
}

pub fn build_state(store: Arc<dyn TimetableStore>) -> Arc<ApiState> {
    Arc::new(ApiState {
        timetable: TimetableService::new(store, SchoolDay::default()),
    })
}

pub fn test_server(store: Arc<dyn TimetableStore>) -> TestServer {
    TestServer::new(app(build_state(store))).expect("test server starts")
}
