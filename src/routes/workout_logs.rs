// ABOUTME: Workout session route handlers
// ABOUTME: Start/resume/progress/rest/sets/complete lifecycle plus achievements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Workout Session Routes
//!
//! A session (workout log) tracks one run through a workout: a progress
//! pointer (current exercise/set), an optional rest-until timestamp, and the
//! set rows actually performed. Sessions stay resumable until completed;
//! completion stamps the elapsed whole-minute duration and runs the
//! achievement checks.

use crate::errors::{AppError, AppResult};
use crate::metrics;
use crate::middleware::AuthUser;
use crate::models::{Achievement, ExerciseLog, SetLog, WorkoutLog};
use crate::pagination::{Page, PageQuery};
use crate::server::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub workout_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub current_exercise: i64,
    pub current_set: i64,
}

#[derive(Debug, Deserialize)]
pub struct RestRequest {
    pub seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct RestResponse {
    pub rest_until: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct LogSetRequest {
    pub exercise_log_id: Uuid,
    pub set_number: i64,
    pub reps: i64,
    pub weight_kg: f64,
}

/// A session with its exercise logs and sets, as returned to clients
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub log: WorkoutLog,
    pub exercises: Vec<ExerciseLog>,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    #[serde(flatten)]
    pub log: WorkoutLog,
    pub new_achievements: Vec<Achievement>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workout-logs", post(start_session))
        .route("/api/workout-logs", get(list_sessions))
        .route("/api/workout-logs/active", get(active_session))
        .route("/api/workout-logs/:id", get(get_session))
        .route("/api/workout-logs/:id", delete(delete_session))
        .route("/api/workout-logs/:id/progress", patch(update_progress))
        .route("/api/workout-logs/:id/rest", post(start_rest))
        .route("/api/workout-logs/:id/sets", post(log_set))
        .route("/api/workout-logs/:id/complete", post(complete_session))
}

/// `POST /api/workout-logs`
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<StartSessionRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let workout = state
        .database
        .get_workout_for_user(request.workout_id, user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load workout: {e}")))?
        .ok_or_else(|| AppError::not_found("Workout"))?;

    let already_active = state
        .database
        .has_active_session(user.id, workout.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to check sessions: {e}")))?;
    if already_active {
        return Err(AppError::conflict(
            "An active session for this workout already exists",
        ));
    }

    let log = WorkoutLog {
        id: Uuid::new_v4(),
        user_id: user.id,
        workout_id: workout.id,
        started_at: Utc::now(),
        completed_at: None,
        duration_minutes: None,
        current_exercise: 0,
        current_set: 0,
        rest_until: None,
    };
    let exercises: Vec<(Uuid, i64)> = workout
        .exercises
        .iter()
        .map(|e| (e.exercise_id, e.position))
        .collect();

    state
        .database
        .create_workout_log(&log, &exercises)
        .await
        .map_err(|e| AppError::database(format!("Failed to start session: {e}")))?;

    let response = session_response(&state, log).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /api/workout-logs/active`
pub async fn active_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<SessionResponse>> {
    let log = state
        .database
        .get_active_workout_log(user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load session: {e}")))?
        .ok_or_else(|| AppError::not_found("Active session"))?;

    Ok(Json(session_response(&state, log).await?))
}

/// `GET /api/workout-logs`
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<WorkoutLog>>> {
    let (logs, total) = state
        .database
        .list_workout_logs(user.id, page.limit(), page.offset())
        .await
        .map_err(|e| AppError::database(format!("Failed to list sessions: {e}")))?;

    Ok(Json(Page::new(logs, total, &page)))
}

/// `GET /api/workout-logs/:id`
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let log = load_session(&state, &user, id).await?;
    Ok(Json(session_response(&state, log).await?))
}

/// `PATCH /api/workout-logs/:id/progress`
pub async fn update_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ProgressRequest>,
) -> AppResult<Json<WorkoutLog>> {
    let mut log = load_active_session(&state, &user, id).await?;

    let exercise_count = state
        .database
        .exercise_count_for_log(log.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to count exercises: {e}")))?;

    if exercise_count == 0 {
        return Err(AppError::invalid_input(
            "session has no exercises to progress through",
        ));
    }
    if request.current_exercise < 0 || request.current_exercise >= exercise_count {
        return Err(AppError::invalid_input(format!(
            "current_exercise must be between 0 and {}",
            exercise_count - 1
        )));
    }
    if request.current_set < 0 {
        return Err(AppError::invalid_input("current_set must be non-negative"));
    }

    state
        .database
        .update_progress(log.id, request.current_exercise, request.current_set)
        .await
        .map_err(|e| AppError::database(format!("Failed to update progress: {e}")))?;

    log.current_exercise = request.current_exercise;
    log.current_set = request.current_set;
    log.rest_until = None;
    Ok(Json(log))
}

/// `POST /api/workout-logs/:id/rest`
pub async fn start_rest(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<RestRequest>,
) -> AppResult<Json<RestResponse>> {
    use crate::constants::limits;

    let log = load_active_session(&state, &user, id).await?;

    if !(limits::MIN_REST_SECONDS..=limits::MAX_REST_SECONDS).contains(&request.seconds) {
        return Err(AppError::invalid_input(format!(
            "seconds must be between {} and {}",
            limits::MIN_REST_SECONDS,
            limits::MAX_REST_SECONDS
        )));
    }

    let rest_until = Utc::now() + Duration::seconds(request.seconds);
    state
        .database
        .set_rest_until(log.id, rest_until)
        .await
        .map_err(|e| AppError::database(format!("Failed to set rest timer: {e}")))?;

    Ok(Json(RestResponse { rest_until }))
}

/// `POST /api/workout-logs/:id/sets`
pub async fn log_set(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<LogSetRequest>,
) -> AppResult<(StatusCode, Json<SetLog>)> {
    let log = load_active_session(&state, &user, id).await?;

    if request.set_number < 1 || request.reps < 1 {
        return Err(AppError::invalid_input(
            "set_number and reps must be at least 1",
        ));
    }
    if !request.weight_kg.is_finite() || request.weight_kg < 0.0 {
        return Err(AppError::invalid_input(
            "weight_kg must be finite and non-negative",
        ));
    }

    let belongs = state
        .database
        .exercise_log_in_session(request.exercise_log_id, log.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to check exercise log: {e}")))?;
    if !belongs {
        return Err(AppError::invalid_input(
            "exercise_log_id does not belong to this session",
        ));
    }

    let set = SetLog {
        id: Uuid::new_v4(),
        exercise_log_id: request.exercise_log_id,
        set_number: request.set_number,
        reps: request.reps,
        weight_kg: request.weight_kg,
        logged_at: Utc::now(),
    };

    state
        .database
        .create_set_log(&set)
        .await
        .map_err(|e| AppError::database(format!("Failed to log set: {e}")))?;

    Ok((StatusCode::CREATED, Json(set)))
}

/// `POST /api/workout-logs/:id/complete`
pub async fn complete_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CompleteResponse>> {
    let mut log = load_active_session(&state, &user, id).await?;

    let completed_at = Utc::now();
    let duration_minutes = (completed_at - log.started_at).num_minutes().max(0);

    state
        .database
        .complete_workout_log(log.id, completed_at, duration_minutes)
        .await
        .map_err(|e| AppError::database(format!("Failed to complete session: {e}")))?;

    log.completed_at = Some(completed_at);
    log.duration_minutes = Some(duration_minutes);
    log.rest_until = None;

    let new_achievements = check_achievements(&state, user.id).await?;
    for achievement in &new_achievements {
        tracing::info!(user_id = %user.id, code = %achievement.code, "achievement earned");
    }

    Ok(Json(CompleteResponse {
        log,
        new_achievements,
    }))
}

/// `DELETE /api/workout-logs/:id`
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let log = load_session(&state, &user, id).await?;

    state
        .database
        .delete_workout_log(log.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete session: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn load_session(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<WorkoutLog> {
    state
        .database
        .get_workout_log(id, user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load session: {e}")))?
        .ok_or_else(|| AppError::not_found("Session"))
}

async fn load_active_session(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<WorkoutLog> {
    let log = load_session(state, user, id).await?;
    if !log.is_active() {
        return Err(AppError::invalid_input("Session is already completed"));
    }
    Ok(log)
}

async fn session_response(state: &AppState, log: WorkoutLog) -> AppResult<SessionResponse> {
    let exercises = state
        .database
        .get_exercise_logs(log.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load exercise logs: {e}")))?;
    Ok(SessionResponse { log, exercises })
}

/// Milestone and streak checks run after every completion; awards are
/// idempotent through the (user, code) uniqueness constraint
async fn check_achievements(state: &AppState, user_id: Uuid) -> AppResult<Vec<Achievement>> {
    let completed = state
        .database
        .count_completed_sessions(user_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to count sessions: {e}")))?;

    let mut candidates: Vec<(&str, &str)> = Vec::new();
    if completed >= 1 {
        candidates.push(("first_workout", "First workout completed"));
    }
    if completed >= 10 {
        candidates.push(("ten_workouts", "10 workouts completed"));
    }
    if completed >= 50 {
        candidates.push(("fifty_workouts", "50 workouts completed"));
    }

    let days = state
        .database
        .completed_session_days(user_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load session days: {e}")))?;
    if metrics::current_streak(&days, Utc::now().date_naive()) >= 7 {
        candidates.push(("week_streak", "7-day workout streak"));
    }

    let mut earned = Vec::new();
    for (code, title) in candidates {
        let achievement = Achievement {
            id: Uuid::new_v4(),
            user_id,
            code: code.into(),
            title: title.into(),
            earned_at: Utc::now(),
        };
        let newly_awarded = state
            .database
            .award_achievement(&achievement)
            .await
            .map_err(|e| AppError::database(format!("Failed to award achievement: {e}")))?;
        if newly_awarded {
            earned.push(achievement);
        }
    }
    Ok(earned)
}
