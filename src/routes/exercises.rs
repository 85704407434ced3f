// ABOUTME: Exercise catalog route handlers
// ABOUTME: Public read with search/filter pagination; mutation is admin-only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

use crate::database::ExerciseFilter;
use crate::errors::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::Exercise;
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
pub struct ExerciseListParams {
    pub search: Option<String>,
    pub muscle_group: Option<String>,
    pub difficulty: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    pub name: String,
    pub muscle_group: String,
    pub equipment: Option<String>,
    pub difficulty: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExerciseRequest {
    pub name: Option<String>,
    pub muscle_group: Option<String>,
    pub equipment: Option<String>,
    pub difficulty: Option<String>,
    pub description: Option<String>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/exercises", get(list_exercises))
        .route("/api/exercises", post(create_exercise))
        .route("/api/exercises/:id", get(get_exercise))
        .route("/api/exercises/:id", patch(update_exercise))
        .route("/api/exercises/:id", delete(delete_exercise))
}

/// `GET /api/exercises`
pub async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExerciseListParams>,
) -> AppResult<Json<Page<Exercise>>> {
    let filter = ExerciseFilter {
        search: params.search,
        muscle_group: params.muscle_group,
        difficulty: params.difficulty,
    };
    let page = PageQuery {
        page: params.page,
        per_page: params.per_page,
    };

    let (exercises, total) = state
        .database
        .list_exercises(&filter, &page)
        .await
        .map_err(|e| AppError::database(format!("Failed to list exercises: {e}")))?;

    Ok(Json(Page::new(exercises, total, &page)))
}

/// `GET /api/exercises/:id`
pub async fn get_exercise(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Exercise>> {
    let exercise = state
        .database
        .get_exercise(id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load exercise: {e}")))?
        .ok_or_else(|| AppError::not_found("Exercise"))?;
    Ok(Json(exercise))
}

/// `POST /api/exercises` (admin)
pub async fn create_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateExerciseRequest>,
) -> AppResult<(StatusCode, Json<Exercise>)> {
    require_admin(&user)?;
    if request.name.trim().is_empty() || request.muscle_group.trim().is_empty() {
        return Err(AppError::invalid_input("name and muscle_group are required"));
    }

    let exercise = Exercise {
        id: Uuid::new_v4(),
        name: request.name,
        muscle_group: request.muscle_group,
        equipment: request.equipment,
        difficulty: request.difficulty,
        description: request.description,
        created_at: Utc::now(),
    };

    state
        .database
        .create_exercise(&exercise)
        .await
        .map_err(|e| AppError::database(format!("Failed to create exercise: {e}")))?;

    Ok((StatusCode::CREATED, Json(exercise)))
}

/// `PATCH /api/exercises/:id` (admin)
pub async fn update_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateExerciseRequest>,
) -> AppResult<Json<Exercise>> {
    require_admin(&user)?;

    let mut exercise = state
        .database
        .get_exercise(id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load exercise: {e}")))?
        .ok_or_else(|| AppError::not_found("Exercise"))?;

    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(AppError::invalid_input("name must not be empty"));
        }
        exercise.name = name;
    }
    if let Some(muscle_group) = request.muscle_group {
        exercise.muscle_group = muscle_group;
    }
    if let Some(difficulty) = request.difficulty {
        exercise.difficulty = difficulty;
    }
    if request.equipment.is_some() {
        exercise.equipment = request.equipment;
    }
    if request.description.is_some() {
        exercise.description = request.description;
    }

    state
        .database
        .update_exercise(&exercise)
        .await
        .map_err(|e| AppError::database(format!("Failed to update exercise: {e}")))?;

    Ok(Json(exercise))
}

/// `DELETE /api/exercises/:id` (admin)
pub async fn delete_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&user)?;

    let deleted = state
        .database
        .delete_exercise(id)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete exercise: {e}")))?;

    if !deleted {
        return Err(AppError::not_found("Exercise"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub(super) fn require_admin(user: &AuthUser) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Admin role required"))
    }
}
