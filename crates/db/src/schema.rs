use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Exclusion constraints guarding `timetable_entries` against double-booking.
pub const SECTION_OVERLAP_CONSTRAINT: &str = "timetable_entries_section_overlap";
pub const STAFF_OVERLAP_CONSTRAINT: &str = "timetable_entries_staff_overlap";
pub const ROOM_OVERLAP_CONSTRAINT: &str = "timetable_entries_room_overlap";

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Equality on uuid/smallint inside gist exclusion constraints
    sqlx::query("CREATE EXTENSION IF NOT EXISTS btree_gist;")
        .execute(pool)
        .await?;

    // Half-open [start, end) range over time of day
    sqlx::query(
        r#"
        DO $$
        BEGIN
            CREATE TYPE timerange AS RANGE (subtype = time);
        EXCEPTION
            WHEN duplicate_object THEN NULL;
        END
        $$;
        "#,
    )
    .execute(pool)
    .await?;

    // Create school_settings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS school_settings (
            school_id UUID PRIMARY KEY,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            CONSTRAINT valid_school_day CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create sections table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sections (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            school_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            level_id UUID NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create subjects table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subjects (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            school_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create staff table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS staff (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            school_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create staff_subjects table (level_id NULL = every level)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS staff_subjects (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            staff_id UUID NOT NULL REFERENCES staff(id) ON DELETE CASCADE,
            subject_id UUID NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
            level_id UUID NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create rooms table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            school_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            room_type VARCHAR(64) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create timetable_requirements table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS timetable_requirements (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            school_id UUID NOT NULL,
            section_id UUID NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
            subject_id UUID NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
            periods_per_week INTEGER NOT NULL,
            duration_minutes INTEGER NOT NULL,
            min_gap_mins INTEGER NOT NULL DEFAULT 0,
            allow_double BOOLEAN NOT NULL DEFAULT FALSE,
            preferred_room_type VARCHAR(64) NULL,
            staff_id UUID NULL REFERENCES staff(id) ON DELETE SET NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_periods CHECK (periods_per_week >= 0),
            CONSTRAINT valid_duration CHECK (duration_minutes > 0),
            CONSTRAINT valid_min_gap CHECK (min_gap_mins >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create pinned_slots table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pinned_slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            school_id UUID NOT NULL,
            section_id UUID NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
            subject_id UUID NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
            staff_id UUID NULL REFERENCES staff(id) ON DELETE SET NULL,
            room_id UUID NULL REFERENCES rooms(id) ON DELETE SET NULL,
            day_of_week SMALLINT NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            CONSTRAINT valid_day CHECK (day_of_week BETWEEN 0 AND 6),
            CONSTRAINT valid_time_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create staff_unavailability table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS staff_unavailability (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            school_id UUID NOT NULL,
            staff_id UUID NOT NULL REFERENCES staff(id) ON DELETE CASCADE,
            day_of_week SMALLINT NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            CONSTRAINT valid_day CHECK (day_of_week BETWEEN 0 AND 6),
            CONSTRAINT valid_time_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create room_unavailability table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS room_unavailability (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            school_id UUID NOT NULL,
            room_id UUID NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
            day_of_week SMALLINT NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            CONSTRAINT valid_day CHECK (day_of_week BETWEEN 0 AND 6),
            CONSTRAINT valid_time_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create timetable_entries table; the exclusion constraints are the
    // authoritative no-overlap guarantee.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS timetable_entries (
            id UUID PRIMARY KEY,
            school_id UUID NOT NULL,
            section_id UUID NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
            subject_id UUID NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
            staff_id UUID NOT NULL REFERENCES staff(id) ON DELETE CASCADE,
            room_id UUID NULL REFERENCES rooms(id) ON DELETE SET NULL,
            day_of_week SMALLINT NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_day CHECK (day_of_week BETWEEN 0 AND 6),
            CONSTRAINT valid_time_range CHECK (end_time > start_time),
            CONSTRAINT timetable_entries_section_overlap EXCLUDE USING gist (
                section_id WITH =,
                day_of_week WITH =,
                timerange(start_time, end_time) WITH &&
            ),
            CONSTRAINT timetable_entries_staff_overlap EXCLUDE USING gist (
                staff_id WITH =,
                day_of_week WITH =,
                timerange(start_time, end_time) WITH &&
            ),
            CONSTRAINT timetable_entries_room_overlap EXCLUDE USING gist (
                room_id WITH =,
                day_of_week WITH =,
                timerange(start_time, end_time) WITH &&
            ) WHERE (room_id IS NOT NULL)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sections_school_id ON sections(school_id);
        CREATE INDEX IF NOT EXISTS idx_subjects_school_id ON subjects(school_id);
        CREATE INDEX IF NOT EXISTS idx_staff_school_id ON staff(school_id);
        CREATE INDEX IF NOT EXISTS idx_staff_subjects_staff_id ON staff_subjects(staff_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_staff_subjects_unique
            ON staff_subjects(staff_id, subject_id, COALESCE(level_id, '00000000-0000-0000-0000-000000000000'::uuid));
        CREATE INDEX IF NOT EXISTS idx_rooms_school_id ON rooms(school_id);
        CREATE INDEX IF NOT EXISTS idx_requirements_school_id ON timetable_requirements(school_id);
        CREATE INDEX IF NOT EXISTS idx_requirements_section_id ON timetable_requirements(section_id);
        CREATE INDEX IF NOT EXISTS idx_pinned_slots_school_id ON pinned_slots(school_id);
        CREATE INDEX IF NOT EXISTS idx_staff_unavailability_school_id ON staff_unavailability(school_id);
        CREATE INDEX IF NOT EXISTS idx_room_unavailability_school_id ON room_unavailability(school_id);
        CREATE INDEX IF NOT EXISTS idx_timetable_entries_school_id ON timetable_entries(school_id);
        CREATE INDEX IF NOT EXISTS idx_timetable_entries_section_id ON timetable_entries(section_id);
        CREATE INDEX IF NOT EXISTS idx_timetable_entries_staff_id ON timetable_entries(staff_id);
        CREATE INDEX IF NOT EXISTS idx_timetable_entries_room_id ON timetable_entries(room_id);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
