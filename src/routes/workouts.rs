// ABOUTME: Workout definition route handlers
// ABOUTME: Transactional create/replace of workouts and their exercise lists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Workout Routes
//!
//! Users see their own workouts plus admin-authored templates. Mutating
//! someone else's workout returns 404, indistinguishable from a workout
//! that does not exist.

use crate::errors::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{Workout, WorkoutExercise};
use crate::server::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct WorkoutExerciseInput {
    pub exercise_id: Uuid,
    pub sets: i64,
    pub reps: i64,
    pub rest_seconds: Option<i64>,
    pub target_weight_kg: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_template: bool,
    pub exercises: Vec<WorkoutExerciseInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkoutRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub exercises: Option<Vec<WorkoutExerciseInput>>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workouts", get(list_workouts))
        .route("/api/workouts", post(create_workout))
        .route("/api/workouts/:id", get(get_workout))
        .route("/api/workouts/:id", patch(update_workout))
        .route("/api/workouts/:id", delete(delete_workout))
}

/// `GET /api/workouts`
pub async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Workout>>> {
    let workouts = state
        .database
        .list_workouts_for_user(user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workouts: {e}")))?;
    Ok(Json(workouts))
}

/// `GET /api/workouts/:id`
pub async fn get_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Workout>> {
    let workout = state
        .database
        .get_workout_for_user(id, user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load workout: {e}")))?
        .ok_or_else(|| AppError::not_found("Workout"))?;
    Ok(Json(workout))
}

/// `POST /api/workouts`
pub async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateWorkoutRequest>,
) -> AppResult<(StatusCode, Json<Workout>)> {
    if request.name.trim().is_empty() {
        return Err(AppError::invalid_input("name is required"));
    }
    if request.is_template && !user.is_admin() {
        return Err(AppError::forbidden("Only admins can create templates"));
    }

    let workout_id = Uuid::new_v4();
    let exercises = build_exercise_rows(&state, workout_id, &request.exercises).await?;

    let workout = Workout {
        id: workout_id,
        owner_id: if request.is_template {
            None
        } else {
            Some(user.id)
        },
        name: request.name,
        description: request.description,
        is_template: request.is_template,
        created_at: Utc::now(),
        exercises,
    };

    state
        .database
        .create_workout(&workout)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout: {e}")))?;

    Ok((StatusCode::CREATED, Json(workout)))
}

/// `PATCH /api/workouts/:id`
pub async fn update_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWorkoutRequest>,
) -> AppResult<Json<Workout>> {
    let mut workout = load_owned_workout(&state, &user, id).await?;

    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(AppError::invalid_input("name must not be empty"));
        }
        workout.name = name;
    }
    if request.description.is_some() {
        workout.description = request.description;
    }
    if let Some(inputs) = request.exercises {
        workout.exercises = build_exercise_rows(&state, workout.id, &inputs).await?;
    }

    state
        .database
        .update_workout(&workout)
        .await
        .map_err(|e| AppError::database(format!("Failed to update workout: {e}")))?;

    Ok(Json(workout))
}

/// `DELETE /api/workouts/:id`
pub async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let workout = load_owned_workout(&state, &user, id).await?;

    state
        .database
        .delete_workout(workout.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete workout: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a workout the caller may mutate: their own, or any as admin.
/// A foreign workout maps to 404 rather than 403 so the response does not
/// reveal whether the id exists.
async fn load_owned_workout(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<Workout> {
    let workout = state
        .database
        .get_workout(id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load workout: {e}")))?
        .ok_or_else(|| AppError::not_found("Workout"))?;

    let owned = workout.owner_id == Some(user.id);
    if owned || user.is_admin() {
        Ok(workout)
    } else {
        Err(AppError::not_found("Workout"))
    }
}

/// Validate the exercise inputs and turn them into ordered rows
async fn build_exercise_rows(
    state: &AppState,
    workout_id: Uuid,
    inputs: &[WorkoutExerciseInput],
) -> AppResult<Vec<WorkoutExercise>> {
    for input in inputs {
        if input.sets < 1 || input.reps < 1 {
            return Err(AppError::invalid_input("sets and reps must be at least 1"));
        }
        if let Some(w) = input.target_weight_kg {
            if !w.is_finite() || w < 0.0 {
                return Err(AppError::invalid_input(
                    "target_weight_kg must be finite and non-negative",
                ));
            }
        }
    }

    let ids: Vec<Uuid> = inputs.iter().map(|i| i.exercise_id).collect();
    let all_exist = state
        .database
        .exercises_exist(&ids)
        .await
        .map_err(|e| AppError::database(format!("Failed to check exercises: {e}")))?;
    if !all_exist {
        return Err(AppError::invalid_input(
            "exercises reference an unknown exercise_id",
        ));
    }

    Ok(inputs
        .iter()
        .enumerate()
        .map(|(position, input)| WorkoutExercise {
            id: Uuid::new_v4(),
            workout_id,
            exercise_id: input.exercise_id,
            position: position as i64,
            sets: input.sets,
            reps: input.reps,
            rest_seconds: input.rest_seconds.unwrap_or(60),
            target_weight_kg: input.target_weight_kg,
        })
        .collect())
}
