// ABOUTME: Workout session database operations
// ABOUTME: Session rows with progress pointer, rest timer, exercise and set logs

use super::Database;
use crate::models::{ExerciseLog, SetLog, WorkoutLog};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_workout_logs(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                workout_id TEXT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                started_at DATETIME NOT NULL,
                completed_at DATETIME,
                duration_minutes INTEGER,
                current_exercise INTEGER NOT NULL DEFAULT 0,
                current_set INTEGER NOT NULL DEFAULT 0,
                rest_until DATETIME
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercise_logs (
                id TEXT PRIMARY KEY,
                workout_log_id TEXT NOT NULL REFERENCES workout_logs(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id),
                position INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS set_logs (
                id TEXT PRIMARY KEY,
                exercise_log_id TEXT NOT NULL REFERENCES exercise_logs(id) ON DELETE CASCADE,
                set_number INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight_kg REAL NOT NULL,
                logged_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_workout_logs_user ON workout_logs(user_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_exercise_logs_session ON exercise_logs(workout_log_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Start a session: the log row plus one exercise log per workout
    /// exercise, in one transaction
    pub async fn create_workout_log(
        &self,
        log: &WorkoutLog,
        exercises: &[(Uuid, i64)],
    ) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO workout_logs (id, user_id, workout_id, started_at, current_exercise, current_set)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(log.id.to_string())
        .bind(log.user_id.to_string())
        .bind(log.workout_id.to_string())
        .bind(log.started_at)
        .bind(log.current_exercise)
        .bind(log.current_set)
        .execute(&mut *tx)
        .await?;

        for (exercise_id, position) in exercises {
            sqlx::query(
                r"
                INSERT INTO exercise_logs (id, workout_log_id, exercise_id, position)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(log.id.to_string())
            .bind(exercise_id.to_string())
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(log.id)
    }

    /// Whether the user already has an uncompleted session for this workout
    pub async fn has_active_session(&self, user_id: Uuid, workout_id: Uuid) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM workout_logs
            WHERE user_id = $1 AND workout_id = $2 AND completed_at IS NULL
            ",
        )
        .bind(user_id.to_string())
        .bind(workout_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Get a session owned by the given user
    pub async fn get_workout_log(&self, id: Uuid, user_id: Uuid) -> Result<Option<WorkoutLog>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, workout_id, started_at, completed_at, duration_minutes,
                   current_exercise, current_set, rest_until
            FROM workout_logs WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_workout_log(&row)).transpose()
    }

    /// The user's most recent uncompleted session, if any
    pub async fn get_active_workout_log(&self, user_id: Uuid) -> Result<Option<WorkoutLog>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, workout_id, started_at, completed_at, duration_minutes,
                   current_exercise, current_set, rest_until
            FROM workout_logs
            WHERE user_id = $1 AND completed_at IS NULL
            ORDER BY started_at DESC
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_workout_log(&row)).transpose()
    }

    /// Session history for a user, newest first
    pub async fn list_workout_logs(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<WorkoutLog>, i64)> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, workout_id, started_at, completed_at, duration_minutes,
                   current_exercise, current_set, rest_until
            FROM workout_logs
            WHERE user_id = $1
            ORDER BY started_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_logs WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        let logs = rows
            .iter()
            .map(Self::row_to_workout_log)
            .collect::<Result<Vec<_>>>()?;
        Ok((logs, total))
    }

    /// Exercise logs with their sets for one session, in workout order
    pub async fn get_exercise_logs(&self, workout_log_id: Uuid) -> Result<Vec<ExerciseLog>> {
        let rows = sqlx::query(
            r"
            SELECT id, workout_log_id, exercise_id, position
            FROM exercise_logs
            WHERE workout_log_id = $1
            ORDER BY position ASC
            ",
        )
        .bind(workout_log_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut logs = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.get("id");
            let workout_log_id: String = row.get("workout_log_id");
            let exercise_id: String = row.get("exercise_id");
            let id = Uuid::parse_str(&id)?;

            logs.push(ExerciseLog {
                id,
                workout_log_id: Uuid::parse_str(&workout_log_id)?,
                exercise_id: Uuid::parse_str(&exercise_id)?,
                position: row.get("position"),
                sets: self.get_set_logs(id).await?,
            });
        }
        Ok(logs)
    }

    /// Whether an exercise log belongs to the given session
    pub async fn exercise_log_in_session(
        &self,
        exercise_log_id: Uuid,
        workout_log_id: Uuid,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM exercise_logs WHERE id = $1 AND workout_log_id = $2",
        )
        .bind(exercise_log_id.to_string())
        .bind(workout_log_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Number of exercises in a session (pointer bounds check)
    pub async fn exercise_count_for_log(&self, workout_log_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM exercise_logs WHERE workout_log_id = $1")
                .bind(workout_log_id.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Advance the progress pointer; any running rest timer is cleared
    pub async fn update_progress(
        &self,
        id: Uuid,
        current_exercise: i64,
        current_set: i64,
    ) -> Result<()> {
        sqlx::query(
            r"
            UPDATE workout_logs
            SET current_exercise = $2, current_set = $3, rest_until = NULL
            WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .bind(current_exercise)
        .bind(current_set)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Arm the rest timer
    pub async fn set_rest_until(&self, id: Uuid, rest_until: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE workout_logs SET rest_until = $2 WHERE id = $1")
            .bind(id.to_string())
            .bind(rest_until)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Append a set to an exercise log
    pub async fn create_set_log(&self, set: &SetLog) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO set_logs (id, exercise_log_id, set_number, reps, weight_kg, logged_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(set.id.to_string())
        .bind(set.exercise_log_id.to_string())
        .bind(set.set_number)
        .bind(set.reps)
        .bind(set.weight_kg)
        .bind(set.logged_at)
        .execute(&self.pool)
        .await?;
        Ok(set.id)
    }

    /// Mark a session completed with its elapsed duration
    pub async fn complete_workout_log(
        &self,
        id: Uuid,
        completed_at: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<()> {
        sqlx::query(
            r"
            UPDATE workout_logs
            SET completed_at = $2, duration_minutes = $3, rest_until = NULL
            WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .bind(completed_at)
        .bind(duration_minutes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a session; exercise and set logs cascade
    pub async fn delete_workout_log(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workout_logs WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total completed sessions for a user
    pub async fn count_completed_sessions(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM workout_logs WHERE user_id = $1 AND completed_at IS NOT NULL",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Completed sessions in a window
    pub async fn count_completed_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM workout_logs
            WHERE user_id = $1 AND completed_at >= $2 AND completed_at < $3
            ",
        )
        .bind(user_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Distinct calendar days with a completed session, newest first
    pub async fn completed_session_days(&self, user_id: Uuid) -> Result<Vec<NaiveDate>> {
        let rows = sqlx::query(
            r"
            SELECT DISTINCT date(completed_at) AS day
            FROM workout_logs
            WHERE user_id = $1 AND completed_at IS NOT NULL
            ORDER BY day DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let day: String = row.get("day");
                Ok(NaiveDate::parse_from_str(&day, "%Y-%m-%d")?)
            })
            .collect()
    }

    /// Training volume (reps x weight) over the user's sets in a window
    pub async fn training_volume_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<f64> {
        let volume: f64 = sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(s.reps * s.weight_kg), 0.0)
            FROM set_logs s
            JOIN exercise_logs el ON el.id = s.exercise_log_id
            JOIN workout_logs wl ON wl.id = el.workout_log_id
            WHERE wl.user_id = $1 AND s.logged_at >= $2 AND s.logged_at < $3
            ",
        )
        .bind(user_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(volume)
    }

    async fn get_set_logs(&self, exercise_log_id: Uuid) -> Result<Vec<SetLog>> {
        let rows = sqlx::query(
            r"
            SELECT id, exercise_log_id, set_number, reps, weight_kg, logged_at
            FROM set_logs
            WHERE exercise_log_id = $1
            ORDER BY set_number ASC
            ",
        )
        .bind(exercise_log_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let exercise_log_id: String = row.get("exercise_log_id");
                Ok(SetLog {
                    id: Uuid::parse_str(&id)?,
                    exercise_log_id: Uuid::parse_str(&exercise_log_id)?,
                    set_number: row.get("set_number"),
                    reps: row.get("reps"),
                    weight_kg: row.get("weight_kg"),
                    logged_at: row.get("logged_at"),
                })
            })
            .collect()
    }

    fn row_to_workout_log(row: &sqlx::sqlite::SqliteRow) -> Result<WorkoutLog> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let workout_id: String = row.get("workout_id");
        Ok(WorkoutLog {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&user_id)?,
            workout_id: Uuid::parse_str(&workout_id)?,
            started_at: row.get("started_at"),
            completed_at: row.get("completed_at"),
            duration_minutes: row.get("duration_minutes"),
            current_exercise: row.get("current_exercise"),
            current_set: row.get("current_set"),
            rest_until: row.get("rest_until"),
        })
    }
}
