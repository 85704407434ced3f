// ABOUTME: Nutrition log route handlers and the macro-target calculator
// ABOUTME: Macros are computed from per-100g food values and stored on the row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Nutrition Routes
//!
//! Meal logging against the food catalog. Macros are scaled from the food's
//! per-100g values at write time and stored on the row, so later catalog
//! edits do not rewrite history. The targets endpoint derives daily macro
//! goals from the user's profile.

use crate::constants::limits;
use crate::database::DailyNutritionSummary;
use crate::errors::{AppError, AppResult};
use crate::metrics::{self, MacroTargets};
use crate::middleware::AuthUser;
use crate::models::{Food, MealType, NutritionLog};
use crate::server::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateNutritionLogRequest {
    pub food_id: Uuid,
    pub meal_type: MealType,
    pub quantity_g: f64,
    pub logged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNutritionLogRequest {
    pub quantity_g: Option<f64>,
    pub meal_type: Option<MealType>,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: NaiveDate,
    pub logs: Vec<NutritionLog>,
    pub summary: DailyNutritionSummary,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/nutrition", post(create_log))
        .route("/api/nutrition", get(list_day))
        .route("/api/nutrition/targets", get(targets))
        .route("/api/nutrition/:id", patch(update_log))
        .route("/api/nutrition/:id", delete(delete_log))
}

/// `POST /api/nutrition`
pub async fn create_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateNutritionLogRequest>,
) -> AppResult<(StatusCode, Json<NutritionLog>)> {
    validate_quantity(request.quantity_g)?;

    let food = state
        .database
        .get_food(request.food_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load food: {e}")))?
        .ok_or_else(|| AppError::invalid_input("food_id does not reference a known food"))?;

    let mut log = NutritionLog {
        id: Uuid::new_v4(),
        user_id: user.id,
        food_id: food.id,
        meal_type: request.meal_type,
        quantity_g: request.quantity_g,
        calories: 0.0,
        protein_g: 0.0,
        carbs_g: 0.0,
        fat_g: 0.0,
        logged_at: request.logged_at.unwrap_or_else(Utc::now),
    };
    apply_macros(&mut log, &food);

    state
        .database
        .create_nutrition_log(&log)
        .await
        .map_err(|e| AppError::database(format!("Failed to create nutrition log: {e}")))?;

    Ok((StatusCode::CREATED, Json(log)))
}

/// `GET /api/nutrition?date=YYYY-MM-DD`
pub async fn list_day(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<DayResponse>> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let logs = state
        .database
        .list_nutrition_logs_for_day(user.id, date)
        .await
        .map_err(|e| AppError::database(format!("Failed to list nutrition logs: {e}")))?;

    let summary = state
        .database
        .daily_nutrition_summary(user.id, date)
        .await
        .map_err(|e| AppError::database(format!("Failed to summarize day: {e}")))?;

    Ok(Json(DayResponse {
        date,
        logs,
        summary,
    }))
}

/// `PATCH /api/nutrition/:id`
pub async fn update_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateNutritionLogRequest>,
) -> AppResult<Json<NutritionLog>> {
    let mut log = state
        .database
        .get_nutrition_log(id, user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load nutrition log: {e}")))?
        .ok_or_else(|| AppError::not_found("Nutrition log"))?;

    if let Some(meal_type) = request.meal_type {
        log.meal_type = meal_type;
    }
    if let Some(quantity_g) = request.quantity_g {
        validate_quantity(quantity_g)?;
        log.quantity_g = quantity_g;

        let food = state
            .database
            .get_food(log.food_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load food: {e}")))?
            .ok_or_else(|| AppError::not_found("Food"))?;
        apply_macros(&mut log, &food);
    }

    state
        .database
        .update_nutrition_log(&log)
        .await
        .map_err(|e| AppError::database(format!("Failed to update nutrition log: {e}")))?;

    Ok(Json(log))
}

/// `DELETE /api/nutrition/:id`
pub async fn delete_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let log = state
        .database
        .get_nutrition_log(id, user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load nutrition log: {e}")))?
        .ok_or_else(|| AppError::not_found("Nutrition log"))?;

    state
        .database
        .delete_nutrition_log(log.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete nutrition log: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/nutrition/targets`
///
/// Requires a saved profile; the calculator is pure and lives in
/// [`crate::metrics`].
pub async fn targets(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<MacroTargets>> {
    let profile = state
        .database
        .get_profile(user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load profile: {e}")))?
        .ok_or_else(|| AppError::not_found("Profile"))?;

    Ok(Json(metrics::macro_targets(&profile)))
}

fn apply_macros(log: &mut NutritionLog, food: &Food) {
    log.calories = metrics::scale_per_100g(food.calories_per_100g, log.quantity_g);
    log.protein_g = metrics::scale_per_100g(food.protein_per_100g, log.quantity_g);
    log.carbs_g = metrics::scale_per_100g(food.carbs_per_100g, log.quantity_g);
    log.fat_g = metrics::scale_per_100g(food.fat_per_100g, log.quantity_g);
}

fn validate_quantity(quantity_g: f64) -> AppResult<()> {
    if !quantity_g.is_finite() || quantity_g <= 0.0 || quantity_g > limits::MAX_FOOD_QUANTITY_G {
        return Err(AppError::invalid_input(format!(
            "quantity_g must be between 0 and {}",
            limits::MAX_FOOD_QUANTITY_G
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_bounds() {
        assert!(validate_quantity(150.0).is_ok());
        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-5.0).is_err());
        assert!(validate_quantity(5001.0).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
    }

    #[test]
    fn macros_scale_from_per_100g_values() {
        let food = Food {
            id: Uuid::new_v4(),
            name: "Oats".into(),
            brand: None,
            calories_per_100g: 100.0,
            protein_per_100g: 13.0,
            carbs_per_100g: 68.0,
            fat_per_100g: 7.0,
            created_at: Utc::now(),
        };
        let mut log = NutritionLog {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            food_id: food.id,
            meal_type: MealType::Breakfast,
            quantity_g: 150.0,
            calories: 0.0,
            protein_g: 0.0,
            carbs_g: 0.0,
            fat_g: 0.0,
            logged_at: Utc::now(),
        };
        apply_macros(&mut log, &food);

        assert!((log.calories - 150.0).abs() < f64::EPSILON);
        assert!((log.protein_g - 19.5).abs() < f64::EPSILON);
        assert!((log.carbs_g - 102.0).abs() < f64::EPSILON);
        assert!((log.fat_g - 10.5).abs() < f64::EPSILON);
    }
}
