use async_trait::async_trait;
use mockall::mock;
use timetabler_core::{
    errors::TimetableResult,
    models::entry::{EntryFilter, TimetableEntry},
    store::{SchoolSnapshot, TimetableStore},
};
use uuid::Uuid;

// Mock store for testing
mock! {
    pub Store {}

    #[async_trait]
    impl TimetableStore for Store {
        async fn load_snapshot(&self, school_id: Uuid) -> eyre::Result<SchoolSnapshot>;

        async fn find_entry(
            &self,
            school_id: Uuid,
            entry_id: Uuid,
        ) -> eyre::Result<Option<TimetableEntry>>;

        async fn list_entries(
            &self,
            school_id: Uuid,
            filter: &EntryFilter,
        ) -> eyre::Result<Vec<TimetableEntry>>;

        async fn commit_placement(
            &self,
            school_id: Uuid,
            remove: &[Uuid],
            entry: &TimetableEntry,
        ) -> TimetableResult<()>;

        async fn delete_entry(&self, school_id: Uuid, entry_id: Uuid) -> eyre::Result<bool>;

        async fn delete_section_entries(
            &self,
            school_id: Uuid,
            section_ids: &[Uuid],
        ) -> eyre::Result<u64>;
    }
}
