// ABOUTME: Achievement database operations
// ABOUTME: Idempotent awards keyed by (user, code) plus listing

use super::Database;
use crate::models::Achievement;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_achievements(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS achievements (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                code TEXT NOT NULL,
                title TEXT NOT NULL,
                earned_at DATETIME NOT NULL,
                UNIQUE(user_id, code)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Award an achievement once; repeat awards are no-ops
    ///
    /// Returns true when the row was newly inserted.
    pub async fn award_achievement(&self, achievement: &Achievement) -> Result<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO achievements (id, user_id, code, title, earned_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(user_id, code) DO NOTHING
            ",
        )
        .bind(achievement.id.to_string())
        .bind(achievement.user_id.to_string())
        .bind(&achievement.code)
        .bind(&achievement.title)
        .bind(achievement.earned_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All achievements earned by a user, newest first
    pub async fn list_achievements(&self, user_id: Uuid) -> Result<Vec<Achievement>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, code, title, earned_at
            FROM achievements
            WHERE user_id = $1
            ORDER BY earned_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let user_id: String = row.get("user_id");
                Ok(Achievement {
                    id: Uuid::parse_str(&id)?,
                    user_id: Uuid::parse_str(&user_id)?,
                    code: row.get("code"),
                    title: row.get("title"),
                    earned_at: row.get("earned_at"),
                })
            })
            .collect()
    }
}
