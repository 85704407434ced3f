// ABOUTME: User and profile database operations
// ABOUTME: Handles account rows, activation state, and body-metric profiles

use super::Database;
use crate::models::{User, UserProfile};
use crate::pagination::PageQuery;
use anyhow::{anyhow, Result};
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create users and profiles tables
    pub(super) async fn migrate_users(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                display_name TEXT,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'trainer', 'admin')),
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                last_active DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                age INTEGER NOT NULL,
                sex TEXT NOT NULL CHECK (sex IN ('male', 'female')),
                height_cm REAL NOT NULL,
                weight_kg REAL NOT NULL,
                activity_level TEXT NOT NULL,
                goal TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already in use or the insert fails.
    pub async fn create_user(&self, user: &User) -> Result<Uuid> {
        if self.get_user_by_email(&user.email).await?.is_some() {
            return Err(anyhow!("Email already in use by another user"));
        }

        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, password_hash, role, is_active, created_at, last_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.last_active)
        .execute(&self.pool)
        .await?;

        Ok(user.id)
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        self.get_user_impl("id", &user_id.to_string()).await
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_impl("email", email).await
    }

    async fn get_user_impl(&self, field: &str, value: &str) -> Result<Option<User>> {
        let query = format!(
            r"
            SELECT id, email, display_name, password_hash, role, is_active, created_at, last_active
            FROM users WHERE {field} = $1
            "
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_user(&row)).transpose()
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let id: String = row.get("id");
        let role: String = row.get("role");

        Ok(User {
            id: Uuid::parse_str(&id)?,
            email: row.get("email"),
            display_name: row.get("display_name"),
            password_hash: row.get("password_hash"),
            role: role.parse()?,
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            last_active: row.get("last_active"),
        })
    }

    /// Update user's last active timestamp
    pub async fn update_last_active(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_active = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Suspend or reactivate a user
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub async fn set_user_active(&self, user_id: Uuid, is_active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("User not found: {user_id}"));
        }
        Ok(())
    }

    /// Permanently delete a user; related rows cascade
    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List users for the admin panel, newest first
    pub async fn list_users(
        &self,
        active: Option<bool>,
        page: &PageQuery,
    ) -> Result<(Vec<User>, i64)> {
        let (rows, total) = if let Some(active) = active {
            let rows = sqlx::query(
                r"
                SELECT id, email, display_name, password_hash, role, is_active, created_at, last_active
                FROM users WHERE is_active = $1
                ORDER BY created_at DESC LIMIT $2 OFFSET $3
                ",
            )
            .bind(active)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active = $1")
                .bind(active)
                .fetch_one(&self.pool)
                .await?;
            (rows, total)
        } else {
            let rows = sqlx::query(
                r"
                SELECT id, email, display_name, password_hash, role, is_active, created_at, last_active
                FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2
                ",
            )
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(&self.pool)
                .await?;
            (rows, total)
        };

        let users = rows
            .iter()
            .map(Self::row_to_user)
            .collect::<Result<Vec<_>>>()?;
        Ok((users, total))
    }

    /// Upsert a user's body-metric profile
    pub async fn upsert_profile(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO user_profiles (user_id, age, sex, height_cm, weight_kg, activity_level, goal, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT(user_id) DO UPDATE SET
                age = $2,
                sex = $3,
                height_cm = $4,
                weight_kg = $5,
                activity_level = $6,
                goal = $7,
                updated_at = $8
            ",
        )
        .bind(profile.user_id.to_string())
        .bind(profile.age)
        .bind(profile.sex.as_str())
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(profile.activity_level.as_str())
        .bind(profile.goal.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a user's profile if one has been saved
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let row = sqlx::query(
            r"
            SELECT user_id, age, sex, height_cm, weight_kg, activity_level, goal, updated_at
            FROM user_profiles WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let user_id: String = row.get("user_id");
            let sex: String = row.get("sex");
            let activity_level: String = row.get("activity_level");
            let goal: String = row.get("goal");

            Ok(UserProfile {
                user_id: Uuid::parse_str(&user_id)?,
                age: row.get("age"),
                sex: sex.parse()?,
                height_cm: row.get("height_cm"),
                weight_kg: row.get("weight_kg"),
                activity_level: activity_level.parse()?,
                goal: goal.parse()?,
                updated_at: row.get("updated_at"),
            })
        })
        .transpose()
    }
}
