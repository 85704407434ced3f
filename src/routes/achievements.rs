// ABOUTME: Achievement listing route
// ABOUTME: Awards happen at workout completion; this only reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

use crate::errors::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::Achievement;
use crate::server::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/achievements", get(list_achievements))
}

/// `GET /api/achievements`
pub async fn list_achievements(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Achievement>>> {
    let achievements = state
        .database
        .list_achievements(user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to list achievements: {e}")))?;
    Ok(Json(achievements))
}
