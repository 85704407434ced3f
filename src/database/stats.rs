// ABOUTME: Platform aggregation queries for the admin dashboard
// ABOUTME: Count and sum queries across users, catalogs, and sessions

use super::Database;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Platform-wide totals for the admin stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub active_users: i64,
    pub total_exercises: i64,
    pub total_foods: i64,
    pub total_workouts: i64,
    pub completed_sessions: i64,
}

impl Database {
    /// Gather the platform totals in one pass
    pub async fn platform_stats(&self) -> Result<PlatformStats> {
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let active_users: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;
        let total_exercises: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
            .fetch_one(&self.pool)
            .await?;
        let total_foods: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM foods")
            .fetch_one(&self.pool)
            .await?;
        let total_workouts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts")
            .fetch_one(&self.pool)
            .await?;
        let completed_sessions: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM workout_logs WHERE completed_at IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(PlatformStats {
            total_users,
            active_users,
            total_exercises,
            total_foods,
            total_workouts,
            completed_sessions,
        })
    }

    /// Users registered inside a window
    pub async fn count_users_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
