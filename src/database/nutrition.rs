// ABOUTME: Nutrition log database operations
// ABOUTME: Meal rows with stored macros plus per-day aggregation queries

use super::Database;
use crate::models::NutritionLog;
use anyhow::Result;
use chrono::NaiveDate;
use sqlx::Row;
use uuid::Uuid;

/// Aggregated macros for one calendar day
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct DailyNutritionSummary {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl Database {
    pub(super) async fn migrate_nutrition(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS nutrition_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                food_id TEXT NOT NULL REFERENCES foods(id),
                meal_type TEXT NOT NULL CHECK (meal_type IN ('breakfast', 'lunch', 'dinner', 'snack')),
                quantity_g REAL NOT NULL,
                calories REAL NOT NULL,
                protein_g REAL NOT NULL,
                carbs_g REAL NOT NULL,
                fat_g REAL NOT NULL,
                logged_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_nutrition_logs_user_day ON nutrition_logs(user_id, logged_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a nutrition log with its precomputed macros
    pub async fn create_nutrition_log(&self, log: &NutritionLog) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO nutrition_logs (id, user_id, food_id, meal_type, quantity_g, calories, protein_g, carbs_g, fat_g, logged_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(log.id.to_string())
        .bind(log.user_id.to_string())
        .bind(log.food_id.to_string())
        .bind(log.meal_type.as_str())
        .bind(log.quantity_g)
        .bind(log.calories)
        .bind(log.protein_g)
        .bind(log.carbs_g)
        .bind(log.fat_g)
        .bind(log.logged_at)
        .execute(&self.pool)
        .await?;

        Ok(log.id)
    }

    /// Get a nutrition log owned by the given user
    pub async fn get_nutrition_log(&self, id: Uuid, user_id: Uuid) -> Result<Option<NutritionLog>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, food_id, meal_type, quantity_g, calories, protein_g, carbs_g, fat_g, logged_at
            FROM nutrition_logs WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_nutrition_log(&row)).transpose()
    }

    /// All of a user's logs for one calendar day, in logged order
    pub async fn list_nutrition_logs_for_day(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<Vec<NutritionLog>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, food_id, meal_type, quantity_g, calories, protein_g, carbs_g, fat_g, logged_at
            FROM nutrition_logs
            WHERE user_id = $1 AND date(logged_at) = $2
            ORDER BY logged_at ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_nutrition_log).collect()
    }

    /// Macro totals for one calendar day
    pub async fn daily_nutrition_summary(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<DailyNutritionSummary> {
        let row = sqlx::query(
            r"
            SELECT COALESCE(SUM(calories), 0.0) AS calories,
                   COALESCE(SUM(protein_g), 0.0) AS protein_g,
                   COALESCE(SUM(carbs_g), 0.0) AS carbs_g,
                   COALESCE(SUM(fat_g), 0.0) AS fat_g
            FROM nutrition_logs
            WHERE user_id = $1 AND date(logged_at) = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(DailyNutritionSummary {
            calories: row.get("calories"),
            protein_g: row.get("protein_g"),
            carbs_g: row.get("carbs_g"),
            fat_g: row.get("fat_g"),
        })
    }

    /// Rewrite a log's quantity, meal slot, and recomputed macros
    pub async fn update_nutrition_log(&self, log: &NutritionLog) -> Result<()> {
        sqlx::query(
            r"
            UPDATE nutrition_logs SET
                meal_type = $2,
                quantity_g = $3,
                calories = $4,
                protein_g = $5,
                carbs_g = $6,
                fat_g = $7
            WHERE id = $1
            ",
        )
        .bind(log.id.to_string())
        .bind(log.meal_type.as_str())
        .bind(log.quantity_g)
        .bind(log.calories)
        .bind(log.protein_g)
        .bind(log.carbs_g)
        .bind(log.fat_g)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a nutrition log
    pub async fn delete_nutrition_log(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM nutrition_logs WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_nutrition_log(row: &sqlx::sqlite::SqliteRow) -> Result<NutritionLog> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let food_id: String = row.get("food_id");
        let meal_type: String = row.get("meal_type");
        Ok(NutritionLog {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&user_id)?,
            food_id: Uuid::parse_str(&food_id)?,
            meal_type: meal_type.parse()?,
            quantity_g: row.get("quantity_g"),
            calories: row.get("calories"),
            protein_g: row.get("protein_g"),
            carbs_g: row.get("carbs_g"),
            fat_g: row.get("fat_g"),
            logged_at: row.get("logged_at"),
        })
    }
}
