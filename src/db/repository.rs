use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Course, DEFAULT_COURSE_DESCRIPTION, NewRegistrationRequest, Registration, RegistrationStatus,
};

/// Raw row shape; `courses` is stored as a JSON array and `status` as text
/// constrained by the schema CHECK.
#[derive(FromRow)]
struct RegistrationRow {
    id: String,
    name: String,
    email: String,
    college: String,
    branch: String,
    courses: String,
    status: String,
    created_at: String,
}

impl RegistrationRow {
    fn into_registration(self) -> Result<Registration, AppError> {
        let courses: Vec<String> = serde_json::from_str(&self.courses)?;
        let status = RegistrationStatus::parse(&self.status).ok_or_else(|| {
            AppError::Upstream(format!("Corrupt status value in store: {}", self.status))
        })?;
        Ok(Registration {
            id: self.id,
            name: self.name,
            email: self.email,
            college: self.college,
            branch: self.branch,
            courses,
            status,
            created_at: self.created_at,
        })
    }
}

/// Inserts a new pending registration. The email must already be
/// normalized; the unique index on it turns a concurrent duplicate into a
/// `Duplicate` error instead of a second row.
pub async fn insert_registration(
    db: &SqlitePool,
    req: NewRegistrationRequest,
) -> Result<Registration, AppError> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let courses_json = serde_json::to_string(&req.courses)?;

    let result = sqlx::query(
        r#"
        INSERT INTO registrations (id, name, email, college, branch, courses, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)
        "#,
    )
    .bind(&id)
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.college)
    .bind(&req.branch)
    .bind(&courses_json)
    .bind(&now)
    .execute(db)
    .await;

    match result {
        Ok(_) => Ok(Registration {
            id,
            name: req.name,
            email: req.email,
            college: req.college,
            branch: req.branch,
            courses: req.courses,
            status: RegistrationStatus::Pending,
            created_at: now,
        }),
        Err(err) if is_unique_violation(&err) => {
            Err(AppError::Duplicate("Email already registered!".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn fetch_registrations(db: &SqlitePool) -> Result<Vec<Registration>, AppError> {
    let rows = sqlx::query_as::<_, RegistrationRow>(
        r#"
        SELECT id, name, email, college, branch, courses, status, created_at
        FROM registrations
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    rows.into_iter().map(RegistrationRow::into_registration).collect()
}

pub async fn find_registration_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Registration>, AppError> {
    let row = sqlx::query_as::<_, RegistrationRow>(
        r#"
        SELECT id, name, email, college, branch, courses, status, created_at
        FROM registrations
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    row.map(RegistrationRow::into_registration).transpose()
}

/// Moves a registration out of `pending`. The update is conditional on the
/// row still being pending so two concurrent decisions serialize to one
/// winner; returns whether this caller won.
pub async fn set_registration_status(
    db: &SqlitePool,
    id: &str,
    status: RegistrationStatus,
) -> Result<bool, AppError> {
    let affected = sqlx::query(
        r#"
        UPDATE registrations
        SET status = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(status.as_str())
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT name, description FROM courses ORDER BY name ASC",
    )
    .fetch_all(db)
    .await?;

    Ok(courses)
}

/// The name must already be trimmed and non-empty.
pub async fn insert_course(
    db: &SqlitePool,
    name: &str,
    description: Option<&str>,
) -> Result<(), AppError> {
    let description = match description {
        Some(d) if !d.trim().is_empty() => d,
        _ => DEFAULT_COURSE_DESCRIPTION,
    };

    let result = sqlx::query("INSERT INTO courses (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(description)
        .execute(db)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => {
            Err(AppError::Duplicate("Course already exists!".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Deletion by exact name, idempotent.
pub async fn delete_course(db: &SqlitePool, name: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM courses WHERE name = ?")
        .bind(name)
        .execute(db)
        .await?;

    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
