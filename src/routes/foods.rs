// ABOUTME: Food catalog route handlers
// ABOUTME: Public search with per-100g macros; mutation is admin-only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

use super::exercises::require_admin;
use crate::errors::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::Food;
use crate::pagination::{Page, PageQuery};
use crate::server::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct FoodListParams {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFoodRequest {
    pub name: String,
    pub brand: Option<String>,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFoodRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub calories_per_100g: Option<f64>,
    pub protein_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fat_per_100g: Option<f64>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/foods", get(list_foods))
        .route("/api/foods", post(create_food))
        .route("/api/foods/:id", get(get_food))
        .route("/api/foods/:id", patch(update_food))
        .route("/api/foods/:id", delete(delete_food))
}

/// `GET /api/foods`
pub async fn list_foods(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FoodListParams>,
) -> AppResult<Json<Page<Food>>> {
    let page = PageQuery {
        page: params.page,
        per_page: params.per_page,
    };

    let (foods, total) = state
        .database
        .list_foods(params.search.as_deref(), &page)
        .await
        .map_err(|e| AppError::database(format!("Failed to list foods: {e}")))?;

    Ok(Json(Page::new(foods, total, &page)))
}

/// `GET /api/foods/:id`
pub async fn get_food(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Food>> {
    let food = state
        .database
        .get_food(id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load food: {e}")))?
        .ok_or_else(|| AppError::not_found("Food"))?;
    Ok(Json(food))
}

/// `POST /api/foods` (admin)
pub async fn create_food(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateFoodRequest>,
) -> AppResult<(StatusCode, Json<Food>)> {
    require_admin(&user)?;
    if request.name.trim().is_empty() {
        return Err(AppError::invalid_input("name is required"));
    }
    validate_macros(&[
        request.calories_per_100g,
        request.protein_per_100g,
        request.carbs_per_100g,
        request.fat_per_100g,
    ])?;

    let food = Food {
        id: Uuid::new_v4(),
        name: request.name,
        brand: request.brand,
        calories_per_100g: request.calories_per_100g,
        protein_per_100g: request.protein_per_100g,
        carbs_per_100g: request.carbs_per_100g,
        fat_per_100g: request.fat_per_100g,
        created_at: Utc::now(),
    };

    state
        .database
        .create_food(&food)
        .await
        .map_err(|e| AppError::database(format!("Failed to create food: {e}")))?;

    Ok((StatusCode::CREATED, Json(food)))
}

/// `PATCH /api/foods/:id` (admin)
pub async fn update_food(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateFoodRequest>,
) -> AppResult<Json<Food>> {
    require_admin(&user)?;

    let mut food = state
        .database
        .get_food(id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load food: {e}")))?
        .ok_or_else(|| AppError::not_found("Food"))?;

    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(AppError::invalid_input("name must not be empty"));
        }
        food.name = name;
    }
    if request.brand.is_some() {
        food.brand = request.brand;
    }
    if let Some(v) = request.calories_per_100g {
        food.calories_per_100g = v;
    }
    if let Some(v) = request.protein_per_100g {
        food.protein_per_100g = v;
    }
    if let Some(v) = request.carbs_per_100g {
        food.carbs_per_100g = v;
    }
    if let Some(v) = request.fat_per_100g {
        food.fat_per_100g = v;
    }
    validate_macros(&[
        food.calories_per_100g,
        food.protein_per_100g,
        food.carbs_per_100g,
        food.fat_per_100g,
    ])?;

    state
        .database
        .update_food(&food)
        .await
        .map_err(|e| AppError::database(format!("Failed to update food: {e}")))?;

    Ok(Json(food))
}

/// `DELETE /api/foods/:id` (admin)
pub async fn delete_food(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&user)?;

    let deleted = state
        .database
        .delete_food(id)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete food: {e}")))?;

    if !deleted {
        return Err(AppError::not_found("Food"));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn validate_macros(values: &[f64]) -> AppResult<()> {
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(AppError::invalid_input(
            "macro values must be finite and non-negative",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_and_nan_macros_rejected() {
        assert!(validate_macros(&[100.0, 10.0, 20.0, 5.0]).is_ok());
        assert!(validate_macros(&[-1.0, 10.0, 20.0, 5.0]).is_err());
        assert!(validate_macros(&[f64::NAN, 10.0, 20.0, 5.0]).is_err());
        assert!(validate_macros(&[f64::INFINITY, 10.0, 20.0, 5.0]).is_err());
    }
}
