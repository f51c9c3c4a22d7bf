use crate::models::DbTimetableEntry;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn get_entries_by_school_id<'e, E>(
    executor: E,
    school_id: Uuid,
    section_id: Option<Uuid>,
    staff_id: Option<Uuid>,
    room_id: Option<Uuid>,
    day_of_week: Option<i16>,
) -> Result<Vec<DbTimetableEntry>>
where
    E: PgExecutor<'e>,
{
    let entries = sqlx::query_as::<_, DbTimetableEntry>(
        r#"
        SELECT id, school_id, section_id, subject_id, staff_id, room_id,
               day_of_week, start_time, end_time, created_at
        FROM timetable_entries
        WHERE school_id = $1
          AND ($2::uuid IS NULL OR section_id = $2)
          AND ($3::uuid IS NULL OR staff_id = $3)
          AND ($4::uuid IS NULL OR room_id = $4)
          AND ($5::smallint IS NULL OR day_of_week = $5)
        ORDER BY day_of_week ASC, start_time ASC, id ASC
        "#,
    )
    .bind(school_id)
    .bind(section_id)
    .bind(staff_id)
    .bind(room_id)
    .bind(day_of_week)
    .fetch_all(executor)
    .await?;

    Ok(entries)
}

pub async fn get_entry_by_id<'e, E>(executor: E, school_id: Uuid, id: Uuid) -> Result<Option<DbTimetableEntry>>
where
    E: PgExecutor<'e>,
{
    let entry = sqlx::query_as::<_, DbTimetableEntry>(
        r#"
        SELECT id, school_id, section_id, subject_id, staff_id, room_id,
               day_of_week, start_time, end_time, created_at
        FROM timetable_entries
        WHERE school_id = $1 AND id = $2
        "#,
    )
    .bind(school_id)
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(entry)
}

pub async fn insert_entry<'e, E>(executor: E, entry: &DbTimetableEntry) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO timetable_entries
            (id, school_id, section_id, subject_id, staff_id, room_id,
             day_of_week, start_time, end_time, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(entry.id)
    .bind(entry.school_id)
    .bind(entry.section_id)
    .bind(entry.subject_id)
    .bind(entry.staff_id)
    .bind(entry.room_id)
    .bind(entry.day_of_week)
    .bind(entry.start_time)
    .bind(entry.end_time)
    .bind(entry.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Returns how many of `ids` existed.
pub async fn delete_entries_by_ids<'e, E>(executor: E, school_id: Uuid, ids: &[Uuid]) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM timetable_entries
        WHERE school_id = $1 AND id = ANY($2)
        "#,
    )
    .bind(school_id)
    .bind(ids)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_entries_by_section_ids<'e, E>(executor: E, school_id: Uuid, section_ids: &[Uuid]) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM timetable_entries
        WHERE school_id = $1 AND section_id = ANY($2)
        "#,
    )
    .bind(school_id)
    .bind(section_ids)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
