// ABOUTME: Body-metric profile route handlers
// ABOUTME: Upsert with range validation; the profile feeds the target calculator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{ActivityLevel, FitnessGoal, Sex, UserProfile};
use crate::server::AppState;
use axum::extract::State;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub age: i64,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal: FitnessGoal,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile))
        .route("/api/profile", put(update_profile))
}

/// `GET /api/profile`
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<UserProfile>> {
    let profile = state
        .database
        .get_profile(user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load profile: {e}")))?
        .ok_or_else(|| AppError::not_found("Profile"))?;
    Ok(Json(profile))
}

/// `PUT /api/profile`
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    validate_metrics(&request)?;

    let profile = UserProfile {
        user_id: user.id,
        age: request.age,
        sex: request.sex,
        height_cm: request.height_cm,
        weight_kg: request.weight_kg,
        activity_level: request.activity_level,
        goal: request.goal,
        updated_at: Utc::now(),
    };

    state
        .database
        .upsert_profile(&profile)
        .await
        .map_err(|e| AppError::database(format!("Failed to save profile: {e}")))?;

    Ok(Json(profile))
}

fn validate_metrics(request: &UpdateProfileRequest) -> AppResult<()> {
    if !(limits::MIN_AGE..=limits::MAX_AGE).contains(&request.age) {
        return Err(AppError::invalid_input(format!(
            "age must be between {} and {}",
            limits::MIN_AGE,
            limits::MAX_AGE
        )));
    }
    if !request.height_cm.is_finite()
        || !(limits::MIN_HEIGHT_CM..=limits::MAX_HEIGHT_CM).contains(&request.height_cm)
    {
        return Err(AppError::invalid_input(format!(
            "height_cm must be between {} and {}",
            limits::MIN_HEIGHT_CM,
            limits::MAX_HEIGHT_CM
        )));
    }
    if !request.weight_kg.is_finite()
        || !(limits::MIN_WEIGHT_KG..=limits::MAX_WEIGHT_KG).contains(&request.weight_kg)
    {
        return Err(AppError::invalid_input(format!(
            "weight_kg must be between {} and {}",
            limits::MIN_WEIGHT_KG,
            limits::MAX_WEIGHT_KG
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> UpdateProfileRequest {
        UpdateProfileRequest {
            age: 30,
            sex: Sex::Male,
            height_cm: 180.0,
            weight_kg: 80.0,
            activity_level: ActivityLevel::Moderate,
            goal: FitnessGoal::Maintain,
        }
    }

    #[test]
    fn metrics_within_bounds_pass() {
        assert!(validate_metrics(&request()).is_ok());
    }

    #[test]
    fn out_of_range_metrics_rejected() {
        let mut r = request();
        r.age = 12;
        assert!(validate_metrics(&r).is_err());

        let mut r = request();
        r.height_cm = 500.0;
        assert!(validate_metrics(&r).is_err());

        let mut r = request();
        r.weight_kg = f64::NAN;
        assert!(validate_metrics(&r).is_err());
    }
}
