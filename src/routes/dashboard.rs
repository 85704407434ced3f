// ABOUTME: Dashboard aggregation route
// ABOUTME: Weekly session counts, streak, training volume, and calorie status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Dashboard Route
//!
//! One read assembling the home-screen numbers: this week vs last week
//! session counts and training volume with percentage deltas, the current
//! completion streak, and today's calories against the computed target.
//! Weeks run Monday through Sunday in UTC.

use crate::errors::{AppError, AppResult};
use crate::metrics;
use crate::middleware::AuthUser;
use crate::server::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub workouts_this_week: i64,
    pub workouts_last_week: i64,
    pub workout_change_pct: f64,
    pub current_streak_days: u32,
    pub volume_this_week_kg: f64,
    pub volume_last_week_kg: f64,
    pub volume_change_pct: f64,
    pub calories_today: f64,
    pub calorie_target: Option<f64>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/dashboard", get(dashboard))
}

/// `GET /api/dashboard`
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<DashboardResponse>> {
    let today = Utc::now().date_naive();
    let week_start = week_start(today);
    let last_week_start = week_start - Duration::days(7);
    let next_week_start = week_start + Duration::days(7);

    let this_week = (day_start(week_start), day_start(next_week_start));
    let last_week = (day_start(last_week_start), day_start(week_start));

    let db = &state.database;

    let workouts_this_week = db
        .count_completed_between(user.id, this_week.0, this_week.1)
        .await
        .map_err(|e| AppError::database(format!("Failed to count sessions: {e}")))?;
    let workouts_last_week = db
        .count_completed_between(user.id, last_week.0, last_week.1)
        .await
        .map_err(|e| AppError::database(format!("Failed to count sessions: {e}")))?;

    let volume_this_week_kg = db
        .training_volume_between(user.id, this_week.0, this_week.1)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum volume: {e}")))?;
    let volume_last_week_kg = db
        .training_volume_between(user.id, last_week.0, last_week.1)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum volume: {e}")))?;

    let days = db
        .completed_session_days(user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load session days: {e}")))?;
    let current_streak_days = metrics::current_streak(&days, today);

    let calories_today = db
        .daily_nutrition_summary(user.id, today)
        .await
        .map_err(|e| AppError::database(format!("Failed to summarize day: {e}")))?
        .calories;

    let calorie_target = db
        .get_profile(user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load profile: {e}")))?
        .map(|profile| metrics::macro_targets(&profile).calories);

    #[allow(clippy::cast_precision_loss)]
    let workout_change_pct =
        metrics::percent_change(workouts_this_week as f64, workouts_last_week as f64);
    let volume_change_pct = metrics::percent_change(volume_this_week_kg, volume_last_week_kg);

    Ok(Json(DashboardResponse {
        workouts_this_week,
        workouts_last_week,
        workout_change_pct,
        current_streak_days,
        volume_this_week_kg,
        volume_last_week_kg,
        volume_change_pct,
        calories_today,
        calorie_target,
    }))
}

/// Monday of the week containing `date`
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_starts_on_monday() {
        // 2025-06-11 is a Wednesday
        let wednesday = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        assert_eq!(
            week_start(wednesday),
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
        );

        let monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        assert_eq!(week_start(monday), monday);

        let sunday = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(
            week_start(sunday),
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
        );
    }
}
