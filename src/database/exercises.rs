// ABOUTME: Exercise catalog database operations
// ABOUTME: Search, filter, and paginate the catalog; admin-gated mutation

use super::Database;
use crate::models::Exercise;
use crate::pagination::PageQuery;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

/// Filters accepted by the exercise catalog listing
#[derive(Debug, Clone, Default)]
pub struct ExerciseFilter {
    /// Case-insensitive name substring
    pub search: Option<String>,
    pub muscle_group: Option<String>,
    pub difficulty: Option<String>,
}

impl Database {
    pub(super) async fn migrate_exercises(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                muscle_group TEXT NOT NULL,
                equipment TEXT,
                difficulty TEXT NOT NULL DEFAULT 'beginner',
                description TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_exercises_muscle_group ON exercises(muscle_group)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a catalog exercise
    pub async fn create_exercise(&self, exercise: &Exercise) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO exercises (id, name, muscle_group, equipment, difficulty, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(exercise.id.to_string())
        .bind(&exercise.name)
        .bind(&exercise.muscle_group)
        .bind(&exercise.equipment)
        .bind(&exercise.difficulty)
        .bind(&exercise.description)
        .bind(exercise.created_at)
        .execute(&self.pool)
        .await?;

        Ok(exercise.id)
    }

    /// Get one exercise by id
    pub async fn get_exercise(&self, id: Uuid) -> Result<Option<Exercise>> {
        let row = sqlx::query(
            r"
            SELECT id, name, muscle_group, equipment, difficulty, description, created_at
            FROM exercises WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_exercise(&row)).transpose()
    }

    /// List catalog exercises matching the filter, alphabetical
    pub async fn list_exercises(
        &self,
        filter: &ExerciseFilter,
        page: &PageQuery,
    ) -> Result<(Vec<Exercise>, i64)> {
        let rows = sqlx::query(
            r"
            SELECT id, name, muscle_group, equipment, difficulty, description, created_at
            FROM exercises
            WHERE ($1 IS NULL OR name LIKE '%' || $1 || '%')
              AND ($2 IS NULL OR muscle_group = $2)
              AND ($3 IS NULL OR difficulty = $3)
            ORDER BY name ASC
            LIMIT $4 OFFSET $5
            ",
        )
        .bind(&filter.search)
        .bind(&filter.muscle_group)
        .bind(&filter.difficulty)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM exercises
            WHERE ($1 IS NULL OR name LIKE '%' || $1 || '%')
              AND ($2 IS NULL OR muscle_group = $2)
              AND ($3 IS NULL OR difficulty = $3)
            ",
        )
        .bind(&filter.search)
        .bind(&filter.muscle_group)
        .bind(&filter.difficulty)
        .fetch_one(&self.pool)
        .await?;

        let exercises = rows
            .iter()
            .map(Self::row_to_exercise)
            .collect::<Result<Vec<_>>>()?;
        Ok((exercises, total))
    }

    /// Update a catalog exercise in place
    pub async fn update_exercise(&self, exercise: &Exercise) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE exercises SET
                name = $2,
                muscle_group = $3,
                equipment = $4,
                difficulty = $5,
                description = $6
            WHERE id = $1
            ",
        )
        .bind(exercise.id.to_string())
        .bind(&exercise.name)
        .bind(&exercise.muscle_group)
        .bind(&exercise.equipment)
        .bind(&exercise.difficulty)
        .bind(&exercise.description)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a catalog exercise
    pub async fn delete_exercise(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_exercise(row: &sqlx::sqlite::SqliteRow) -> Result<Exercise> {
        let id: String = row.get("id");
        Ok(Exercise {
            id: Uuid::parse_str(&id)?,
            name: row.get("name"),
            muscle_group: row.get("muscle_group"),
            equipment: row.get("equipment"),
            difficulty: row.get("difficulty"),
            description: row.get("description"),
            created_at: row.get("created_at"),
        })
    }
}
