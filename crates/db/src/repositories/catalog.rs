use crate::models::{DbRoom, DbSchoolSettings, DbSection, DbStaff, DbStaffSubject, DbSubject};
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn get_school_settings<'e, E>(executor: E, school_id: Uuid) -> Result<Option<DbSchoolSettings>>
where
    E: PgExecutor<'e>,
{
    let settings = sqlx::query_as::<_, DbSchoolSettings>(
        r#"
        SELECT school_id, start_time, end_time
        FROM school_settings
        WHERE school_id = $1
        "#,
    )
    .bind(school_id)
    .fetch_optional(executor)
    .await?;

    Ok(settings)
}

pub async fn get_sections_by_school_id<'e, E>(executor: E, school_id: Uuid) -> Result<Vec<DbSection>>
where
    E: PgExecutor<'e>,
{
    let sections = sqlx::query_as::<_, DbSection>(
        r#"
        SELECT id, school_id, name, level_id
        FROM sections
        WHERE school_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(school_id)
    .fetch_all(executor)
    .await?;

    Ok(sections)
}

pub async fn get_subjects_by_school_id<'e, E>(executor: E, school_id: Uuid) -> Result<Vec<DbSubject>>
where
    E: PgExecutor<'e>,
{
    let subjects = sqlx::query_as::<_, DbSubject>(
        r#"
        SELECT id, school_id, name
        FROM subjects
        WHERE school_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(school_id)
    .fetch_all(executor)
    .await?;

    Ok(subjects)
}

pub async fn get_staff_by_school_id<'e, E>(executor: E, school_id: Uuid) -> Result<Vec<DbStaff>>
where
    E: PgExecutor<'e>,
{
    let staff = sqlx::query_as::<_, DbStaff>(
        r#"
        SELECT id, school_id, name
        FROM staff
        WHERE school_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(school_id)
    .fetch_all(executor)
    .await?;

    Ok(staff)
}

pub async fn get_staff_subjects_by_school_id<'e, E>(executor: E, school_id: Uuid) -> Result<Vec<DbStaffSubject>>
where
    E: PgExecutor<'e>,
{
    let links = sqlx::query_as::<_, DbStaffSubject>(
        r#"
        SELECT ss.staff_id, ss.subject_id, ss.level_id
        FROM staff_subjects ss
        JOIN staff s ON s.id = ss.staff_id
        WHERE s.school_id = $1
        ORDER BY ss.staff_id ASC, ss.subject_id ASC
        "#,
    )
    .bind(school_id)
    .fetch_all(executor)
    .await?;

    Ok(links)
}

pub async fn get_rooms_by_school_id<'e, E>(executor: E, school_id: Uuid) -> Result<Vec<DbRoom>>
where
    E: PgExecutor<'e>,
{
    let rooms = sqlx::query_as::<_, DbRoom>(
        r#"
        SELECT id, school_id, name, room_type
        FROM rooms
        WHERE school_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(school_id)
    .fetch_all(executor)
    .await?;

    Ok(rooms)
}
