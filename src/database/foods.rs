// ABOUTME: Food catalog database operations
// ABOUTME: Search and paginate foods with per-100g macros; admin-gated mutation

use super::Database;
use crate::models::Food;
use crate::pagination::PageQuery;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_foods(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS foods (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                brand TEXT,
                calories_per_100g REAL NOT NULL,
                protein_per_100g REAL NOT NULL,
                carbs_per_100g REAL NOT NULL,
                fat_per_100g REAL NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_foods_name ON foods(name)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a catalog food
    pub async fn create_food(&self, food: &Food) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO foods (id, name, brand, calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(food.id.to_string())
        .bind(&food.name)
        .bind(&food.brand)
        .bind(food.calories_per_100g)
        .bind(food.protein_per_100g)
        .bind(food.carbs_per_100g)
        .bind(food.fat_per_100g)
        .bind(food.created_at)
        .execute(&self.pool)
        .await?;

        Ok(food.id)
    }

    /// Get one food by id
    pub async fn get_food(&self, id: Uuid) -> Result<Option<Food>> {
        let row = sqlx::query(
            r"
            SELECT id, name, brand, calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g, created_at
            FROM foods WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_food(&row)).transpose()
    }

    /// List catalog foods, optionally filtered by a name/brand substring
    pub async fn list_foods(
        &self,
        search: Option<&str>,
        page: &PageQuery,
    ) -> Result<(Vec<Food>, i64)> {
        let rows = sqlx::query(
            r"
            SELECT id, name, brand, calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g, created_at
            FROM foods
            WHERE ($1 IS NULL OR name LIKE '%' || $1 || '%' OR brand LIKE '%' || $1 || '%')
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(search)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM foods
            WHERE ($1 IS NULL OR name LIKE '%' || $1 || '%' OR brand LIKE '%' || $1 || '%')
            ",
        )
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        let foods = rows
            .iter()
            .map(Self::row_to_food)
            .collect::<Result<Vec<_>>>()?;
        Ok((foods, total))
    }

    /// Update a catalog food in place
    pub async fn update_food(&self, food: &Food) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE foods SET
                name = $2,
                brand = $3,
                calories_per_100g = $4,
                protein_per_100g = $5,
                carbs_per_100g = $6,
                fat_per_100g = $7
            WHERE id = $1
            ",
        )
        .bind(food.id.to_string())
        .bind(&food.name)
        .bind(&food.brand)
        .bind(food.calories_per_100g)
        .bind(food.protein_per_100g)
        .bind(food.carbs_per_100g)
        .bind(food.fat_per_100g)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a catalog food
    pub async fn delete_food(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM foods WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_food(row: &sqlx::sqlite::SqliteRow) -> Result<Food> {
        let id: String = row.get("id");
        Ok(Food {
            id: Uuid::parse_str(&id)?,
            name: row.get("name"),
            brand: row.get("brand"),
            calories_per_100g: row.get("calories_per_100g"),
            protein_per_100g: row.get("protein_per_100g"),
            carbs_per_100g: row.get("carbs_per_100g"),
            fat_per_100g: row.get("fat_per_100g"),
            created_at: row.get("created_at"),
        })
    }
}
