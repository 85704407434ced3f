// ABOUTME: Workout definition database operations
// ABOUTME: Transactional create/update of workouts with their ordered exercise rows

use super::Database;
use crate::models::{Workout, WorkoutExercise};
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_workouts(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workouts (
                id TEXT PRIMARY KEY,
                owner_id TEXT REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                is_template BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_exercises (
                id TEXT PRIMARY KEY,
                workout_id TEXT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id),
                position INTEGER NOT NULL,
                sets INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                rest_seconds INTEGER NOT NULL DEFAULT 60,
                target_weight_kg REAL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_workouts_owner ON workouts(owner_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_workout_exercises_workout ON workout_exercises(workout_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Check every referenced exercise id exists in the catalog
    pub async fn exercises_exist(&self, ids: &[Uuid]) -> Result<bool> {
        for id in ids {
            let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises WHERE id = $1")
                .bind(id.to_string())
                .fetch_one(&self.pool)
                .await?;
            if found == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Create a workout and its exercise rows in one transaction
    pub async fn create_workout(&self, workout: &Workout) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO workouts (id, owner_id, name, description, is_template, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(workout.id.to_string())
        .bind(workout.owner_id.map(|id| id.to_string()))
        .bind(&workout.name)
        .bind(&workout.description)
        .bind(workout.is_template)
        .bind(workout.created_at)
        .execute(&mut *tx)
        .await?;

        for exercise in &workout.exercises {
            sqlx::query(
                r"
                INSERT INTO workout_exercises (id, workout_id, exercise_id, position, sets, reps, rest_seconds, target_weight_kg)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ",
            )
            .bind(exercise.id.to_string())
            .bind(workout.id.to_string())
            .bind(exercise.exercise_id.to_string())
            .bind(exercise.position)
            .bind(exercise.sets)
            .bind(exercise.reps)
            .bind(exercise.rest_seconds)
            .bind(exercise.target_weight_kg)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(workout.id)
    }

    /// Get a workout visible to the given user: their own, or a template
    pub async fn get_workout_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Workout>> {
        let row = sqlx::query(
            r"
            SELECT id, owner_id, name, description, is_template, created_at
            FROM workouts
            WHERE id = $1 AND (owner_id = $2 OR is_template = 1)
            ",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut workout = Self::row_to_workout(&row)?;
                workout.exercises = self.get_workout_exercises(workout.id).await?;
                Ok(Some(workout))
            }
            None => Ok(None),
        }
    }

    /// Get a workout regardless of visibility (admin paths)
    pub async fn get_workout(&self, id: Uuid) -> Result<Option<Workout>> {
        let row = sqlx::query(
            r"
            SELECT id, owner_id, name, description, is_template, created_at
            FROM workouts WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut workout = Self::row_to_workout(&row)?;
                workout.exercises = self.get_workout_exercises(workout.id).await?;
                Ok(Some(workout))
            }
            None => Ok(None),
        }
    }

    /// List a user's workouts plus admin templates, newest first
    pub async fn list_workouts_for_user(&self, user_id: Uuid) -> Result<Vec<Workout>> {
        let rows = sqlx::query(
            r"
            SELECT id, owner_id, name, description, is_template, created_at
            FROM workouts
            WHERE owner_id = $1 OR is_template = 1
            ORDER BY is_template ASC, created_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut workouts = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut workout = Self::row_to_workout(row)?;
            workout.exercises = self.get_workout_exercises(workout.id).await?;
            workouts.push(workout);
        }
        Ok(workouts)
    }

    /// Replace a workout's fields and exercise list in one transaction
    pub async fn update_workout(&self, workout: &Workout) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            UPDATE workouts SET name = $2, description = $3 WHERE id = $1
            ",
        )
        .bind(workout.id.to_string())
        .bind(&workout.name)
        .bind(&workout.description)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = $1")
            .bind(workout.id.to_string())
            .execute(&mut *tx)
            .await?;

        for exercise in &workout.exercises {
            sqlx::query(
                r"
                INSERT INTO workout_exercises (id, workout_id, exercise_id, position, sets, reps, rest_seconds, target_weight_kg)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ",
            )
            .bind(exercise.id.to_string())
            .bind(workout.id.to_string())
            .bind(exercise.exercise_id.to_string())
            .bind(exercise.position)
            .bind(exercise.sets)
            .bind(exercise.reps)
            .bind(exercise.rest_seconds)
            .bind(exercise.target_weight_kg)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a workout; exercise rows cascade
    pub async fn delete_workout(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Ordered exercise rows for one workout
    pub async fn get_workout_exercises(&self, workout_id: Uuid) -> Result<Vec<WorkoutExercise>> {
        let rows = sqlx::query(
            r"
            SELECT id, workout_id, exercise_id, position, sets, reps, rest_seconds, target_weight_kg
            FROM workout_exercises
            WHERE workout_id = $1
            ORDER BY position ASC
            ",
        )
        .bind(workout_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let workout_id: String = row.get("workout_id");
                let exercise_id: String = row.get("exercise_id");
                Ok(WorkoutExercise {
                    id: Uuid::parse_str(&id)?,
                    workout_id: Uuid::parse_str(&workout_id)?,
                    exercise_id: Uuid::parse_str(&exercise_id)?,
                    position: row.get("position"),
                    sets: row.get("sets"),
                    reps: row.get("reps"),
                    rest_seconds: row.get("rest_seconds"),
                    target_weight_kg: row.get("target_weight_kg"),
                })
            })
            .collect()
    }

    fn row_to_workout(row: &sqlx::sqlite::SqliteRow) -> Result<Workout> {
        let id: String = row.get("id");
        let owner_id: Option<String> = row.get("owner_id");
        Ok(Workout {
            id: Uuid::parse_str(&id)?,
            owner_id: owner_id.as_deref().map(Uuid::parse_str).transpose()?,
            name: row.get("name"),
            description: row.get("description"),
            is_template: row.get("is_template"),
            created_at: row.get("created_at"),
            exercises: Vec::new(),
        })
    }
}
