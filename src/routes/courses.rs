// ABOUTME: Trainer course route handlers
// ABOUTME: Authoring is trainer/admin-gated; readers see published courses only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Course Routes
//!
//! Trainers author and publish paid courses; any authenticated user can
//! browse the published catalog. Price is stored in cents; checkout is out
//! of scope. Mutating someone else's course returns 404.

use crate::errors::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::Course;
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
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/courses", get(list_courses))
        .route("/api/courses", post(create_course))
        .route("/api/courses/:id", get(get_course))
        .route("/api/courses/:id", patch(update_course))
        .route("/api/courses/:id", delete(delete_course))
        .route("/api/courses/:id/publish", post(publish_course))
}

/// `GET /api/courses`
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<Course>>> {
    let (courses, total) = state
        .database
        .list_published_courses(&page)
        .await
        .map_err(|e| AppError::database(format!("Failed to list courses: {e}")))?;

    Ok(Json(Page::new(courses, total, &page)))
}

/// `GET /api/courses/:id`
///
/// Unpublished courses are visible only to their author and admins.
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Course>> {
    let course = state
        .database
        .get_course(id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load course: {e}")))?
        .ok_or_else(|| AppError::not_found("Course"))?;

    if course.published || course.trainer_id == user.id || user.is_admin() {
        Ok(Json(course))
    } else {
        Err(AppError::not_found("Course"))
    }
}

/// `POST /api/courses` (trainer or admin)
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateCourseRequest>,
) -> AppResult<(StatusCode, Json<Course>)> {
    if !user.role.can_publish_courses() {
        return Err(AppError::forbidden("Trainer role required"));
    }
    if request.title.trim().is_empty() {
        return Err(AppError::invalid_input("title is required"));
    }
    if request.price_cents < 0 {
        return Err(AppError::invalid_input("price_cents must be non-negative"));
    }

    let now = Utc::now();
    let course = Course {
        id: Uuid::new_v4(),
        trainer_id: user.id,
        title: request.title,
        description: request.description,
        price_cents: request.price_cents,
        published: false,
        created_at: now,
        updated_at: now,
    };

    state
        .database
        .create_course(&course)
        .await
        .map_err(|e| AppError::database(format!("Failed to create course: {e}")))?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// `PATCH /api/courses/:id`
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCourseRequest>,
) -> AppResult<Json<Course>> {
    let mut course = load_authored_course(&state, &user, id).await?;

    if let Some(title) = request.title {
        if title.trim().is_empty() {
            return Err(AppError::invalid_input("title must not be empty"));
        }
        course.title = title;
    }
    if request.description.is_some() {
        course.description = request.description;
    }
    if let Some(price_cents) = request.price_cents {
        if price_cents < 0 {
            return Err(AppError::invalid_input("price_cents must be non-negative"));
        }
        course.price_cents = price_cents;
    }
    course.updated_at = Utc::now();

    state
        .database
        .update_course(&course)
        .await
        .map_err(|e| AppError::database(format!("Failed to update course: {e}")))?;

    Ok(Json(course))
}

/// `POST /api/courses/:id/publish`
pub async fn publish_course(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Course>> {
    let mut course = load_authored_course(&state, &user, id).await?;

    state
        .database
        .publish_course(course.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to publish course: {e}")))?;

    course.published = true;
    course.updated_at = Utc::now();
    Ok(Json(course))
}

/// `DELETE /api/courses/:id`
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let course = load_authored_course(&state, &user, id).await?;

    state
        .database
        .delete_course(course.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete course: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a course the caller may mutate: their own, or any as admin.
/// Foreign courses map to 404.
async fn load_authored_course(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<Course> {
    let course = state
        .database
        .get_course(id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load course: {e}")))?
        .ok_or_else(|| AppError::not_found("Course"))?;

    if course.trainer_id == user.id || user.is_admin() {
        Ok(course)
    } else {
        Err(AppError::not_found("Course"))
    }
}
