// ABOUTME: Database management: SQLite pool, migrations, and domain queries
// ABOUTME: Connection setup retries with backoff to ride out managed-DB cold starts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Database Management
//!
//! Persistence for the whole application. The [`Database`] wraps a SQLite
//! pool; per-domain query methods live in the sibling modules as `impl`
//! blocks, the way the tables group in the schema.

mod achievements;
mod courses;
mod exercises;
mod foods;
mod nutrition;
mod stats;
mod users;
mod workout_logs;
mod workouts;

pub use exercises::ExerciseFilter;
pub use nutrition::DailyNutritionSummary;
pub use stats::PlatformStats;

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::time::Duration;
use tracing::{info, warn};

/// Database manager for all persistent state
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// Connection attempts are retried with exponential backoff because
    /// managed databases auto-suspend and take a few seconds to wake.
    ///
    /// # Errors
    ///
    /// Returns an error if every connection attempt fails or migration fails.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let url = if config.url.starts_with("sqlite:") && !config.url.contains("mode=") {
            format!("{}?mode=rwc", config.url)
        } else {
            config.url.clone()
        };

        let pool = Self::connect_with_retry(
            &url,
            config.max_connections,
            config.connect_retries,
            config.connect_backoff_ms,
        )
        .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Connect directly to an already-reachable database (tests)
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migration fails.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn connect_with_retry(
        url: &str,
        max_connections: u32,
        retries: u32,
        backoff_ms: u64,
    ) -> Result<Pool<Sqlite>> {
        let mut attempt = 0;
        let mut backoff = Duration::from_millis(backoff_ms);

        loop {
            match SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect(url)
                .await
            {
                Ok(pool) => {
                    if attempt > 0 {
                        info!(attempt, "database connection established after retry");
                    }
                    return Ok(pool);
                }
                Err(e) if attempt < retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "database connection failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&self.pool)
            .await?;

        self.migrate_users().await?;
        self.migrate_exercises().await?;
        self.migrate_foods().await?;
        self.migrate_workouts().await?;
        self.migrate_workout_logs().await?;
        self.migrate_nutrition().await?;
        self.migrate_achievements().await?;
        self.migrate_courses().await?;

        Ok(())
    }
}
