use crate::models::{DbPinnedSlot, DbRequirement, DbUnavailability};
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn get_requirements_by_school_id<'e, E>(executor: E, school_id: Uuid) -> Result<Vec<DbRequirement>>
where
    E: PgExecutor<'e>,
{
    let requirements = sqlx::query_as::<_, DbRequirement>(
        r#"
        SELECT id, school_id, section_id, subject_id, periods_per_week, duration_minutes,
               min_gap_mins, allow_double, preferred_room_type, staff_id
        FROM timetable_requirements
        WHERE school_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(school_id)
    .fetch_all(executor)
    .await?;

    Ok(requirements)
}

pub async fn get_pinned_slots_by_school_id<'e, E>(executor: E, school_id: Uuid) -> Result<Vec<DbPinnedSlot>>
where
    E: PgExecutor<'e>,
{
    let pins = sqlx::query_as::<_, DbPinnedSlot>(
        r#"
        SELECT id, school_id, section_id, subject_id, staff_id, room_id,
               day_of_week, start_time, end_time
        FROM pinned_slots
        WHERE school_id = $1
        ORDER BY day_of_week ASC, start_time ASC, id ASC
        "#,
    )
    .bind(school_id)
    .fetch_all(executor)
    .await?;

    Ok(pins)
}

pub async fn get_staff_unavailability_by_school_id<'e, E>(
    executor: E,
    school_id: Uuid,
) -> Result<Vec<DbUnavailability>>
where
    E: PgExecutor<'e>,
{
    let windows = sqlx::query_as::<_, DbUnavailability>(
        r#"
        SELECT id, school_id, staff_id AS resource_id, day_of_week, start_time, end_time
        FROM staff_unavailability
        WHERE school_id = $1
        ORDER BY day_of_week ASC, start_time ASC, id ASC
        "#,
    )
    .bind(school_id)
    .fetch_all(executor)
    .await?;

    Ok(windows)
}

pub async fn get_room_unavailability_by_school_id<'e, E>(
    executor: E,
    school_id: Uuid,
) -> Result<Vec<DbUnavailability>>
where
    E: PgExecutor<'e>,
{
    let windows = sqlx::query_as::<_, DbUnavailability>(
        r#"
        SELECT id, school_id, room_id AS resource_id, day_of_week, start_time, end_time
        FROM room_unavailability
        WHERE school_id = $1
        ORDER BY day_of_week ASC, start_time ASC, id ASC
        "#,
    )
    .bind(school_id)
    .fetch_all(executor)
    .await?;

    Ok(windows)
}
