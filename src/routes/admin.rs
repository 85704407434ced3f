// ABOUTME: Admin route handlers for platform stats and user management
// ABOUTME: Every endpoint requires the admin role
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Admin Routes
//!
//! Platform statistics and user management. Suspension and deletion refuse
//! to act on the calling admin's own account.

use super::exercises::require_admin;
use crate::errors::{AppError, AppResult};
use crate::metrics;
use crate::middleware::AuthUser;
use crate::models::User;
use crate::pagination::{Page, PageQuery};
use crate::server::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub active: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub total_users: i64,
    pub active_users: i64,
    pub total_exercises: i64,
    pub total_foods: i64,
    pub total_workouts: i64,
    pub completed_sessions: i64,
    pub new_users_this_month: i64,
    pub new_users_last_month: i64,
    pub new_user_change_pct: f64,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/:id/suspend", post(suspend_user))
        .route("/api/admin/users/:id/activate", post(activate_user))
        .route("/api/admin/users/:id", delete(delete_user))
}

/// `GET /api/admin/stats`
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<AdminStatsResponse>> {
    require_admin(&user)?;

    let totals = state
        .database
        .platform_stats()
        .await
        .map_err(|e| AppError::database(format!("Failed to gather stats: {e}")))?;

    let today = Utc::now().date_naive();
    let this_month = month_start(today);
    let next_month = next_month_start(today);
    let last_month = previous_month_start(today);

    let new_users_this_month = state
        .database
        .count_users_created_between(day_start(this_month), day_start(next_month))
        .await
        .map_err(|e| AppError::database(format!("Failed to count users: {e}")))?;
    let new_users_last_month = state
        .database
        .count_users_created_between(day_start(last_month), day_start(this_month))
        .await
        .map_err(|e| AppError::database(format!("Failed to count users: {e}")))?;

    #[allow(clippy::cast_precision_loss)]
    let new_user_change_pct =
        metrics::percent_change(new_users_this_month as f64, new_users_last_month as f64);

    Ok(Json(AdminStatsResponse {
        total_users: totals.total_users,
        active_users: totals.active_users,
        total_exercises: totals.total_exercises,
        total_foods: totals.total_foods,
        total_workouts: totals.total_workouts,
        completed_sessions: totals.completed_sessions,
        new_users_this_month,
        new_users_last_month,
        new_user_change_pct,
    }))
}

/// `GET /api/admin/users`
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<Page<User>>> {
    require_admin(&user)?;

    let page = PageQuery {
        page: params.page,
        per_page: params.per_page,
    };

    let (users, total) = state
        .database
        .list_users(params.active, &page)
        .await
        .map_err(|e| AppError::database(format!("Failed to list users: {e}")))?;

    Ok(Json(Page::new(users, total, &page)))
}

/// `POST /api/admin/users/:id/suspend`
pub async fn suspend_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    set_active(&state, &user, id, false).await
}

/// `POST /api/admin/users/:id/activate`
pub async fn activate_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    set_active(&state, &user, id, true).await
}

/// `DELETE /api/admin/users/:id`
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&user)?;
    if id == user.id {
        return Err(AppError::invalid_input("Cannot delete your own account"));
    }

    let deleted = state
        .database
        .delete_user(id)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete user: {e}")))?;
    if !deleted {
        return Err(AppError::not_found("User"));
    }

    tracing::info!(admin_id = %user.id, user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn set_active(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
    is_active: bool,
) -> AppResult<StatusCode> {
    require_admin(admin)?;
    if id == admin.id {
        return Err(AppError::invalid_input(
            "Cannot change your own account's active state",
        ));
    }

    state
        .database
        .get_user(id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load user: {e}")))?
        .ok_or_else(|| AppError::not_found("User"))?;

    state
        .database
        .set_user_active(id, is_active)
        .await
        .map_err(|e| AppError::database(format!("Failed to update user: {e}")))?;

    tracing::info!(admin_id = %admin.id, user_id = %id, is_active, "user active state changed");
    Ok(StatusCode::NO_CONTENT)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

fn previous_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_windows_wrap_year_boundaries() {
        let jan = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(
            previous_month_start(jan),
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
        );

        let dec = NaiveDate::from_ymd_opt(2025, 12, 15).unwrap();
        assert_eq!(
            next_month_start(dec),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );

        assert_eq!(
            month_start(dec),
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
        );
    }
}
