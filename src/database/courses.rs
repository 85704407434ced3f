// ABOUTME: Trainer course database operations
// ABOUTME: Course rows with publish state; public listing shows published only

use super::Database;
use crate::models::Course;
use crate::pagination::PageQuery;
use anyhow::Result;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_courses(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS courses (
                id TEXT PRIMARY KEY,
                trainer_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                price_cents INTEGER NOT NULL DEFAULT 0,
                published BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_courses_trainer ON courses(trainer_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a course
    pub async fn create_course(&self, course: &Course) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO courses (id, trainer_id, title, description, price_cents, published, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(course.id.to_string())
        .bind(course.trainer_id.to_string())
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.price_cents)
        .bind(course.published)
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(course.id)
    }

    /// Get one course by id
    pub async fn get_course(&self, id: Uuid) -> Result<Option<Course>> {
        let row = sqlx::query(
            r"
            SELECT id, trainer_id, title, description, price_cents, published, created_at, updated_at
            FROM courses WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_course(&row)).transpose()
    }

    /// Published courses, newest first
    pub async fn list_published_courses(&self, page: &PageQuery) -> Result<(Vec<Course>, i64)> {
        let rows = sqlx::query(
            r"
            SELECT id, trainer_id, title, description, price_cents, published, created_at, updated_at
            FROM courses
            WHERE published = 1
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE published = 1")
            .fetch_one(&self.pool)
            .await?;

        let courses = rows
            .iter()
            .map(Self::row_to_course)
            .collect::<Result<Vec<_>>>()?;
        Ok((courses, total))
    }

    /// Update a course's listing fields
    pub async fn update_course(&self, course: &Course) -> Result<()> {
        sqlx::query(
            r"
            UPDATE courses SET
                title = $2,
                description = $3,
                price_cents = $4,
                updated_at = $5
            WHERE id = $1
            ",
        )
        .bind(course.id.to_string())
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.price_cents)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Flip a course to published
    pub async fn publish_course(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE courses SET published = 1, updated_at = $2 WHERE id = $1")
            .bind(id.to_string())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a course
    pub async fn delete_course(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_course(row: &sqlx::sqlite::SqliteRow) -> Result<Course> {
        let id: String = row.get("id");
        let trainer_id: String = row.get("trainer_id");
        Ok(Course {
            id: Uuid::parse_str(&id)?,
            trainer_id: Uuid::parse_str(&trainer_id)?,
            title: row.get("title"),
            description: row.get("description"),
            price_cents: row.get("price_cents"),
            published: row.get("published"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}
