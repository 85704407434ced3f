// ABOUTME: Authentication route handlers for registration, login, and sessions
// ABOUTME: bcrypt password handling runs on the blocking pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Authentication Routes
//!
//! Registration, login, token refresh, and identity lookup. Login failures
//! for a wrong email and a wrong password return the same message so the
//! endpoint does not disclose which accounts exist.

use crate::auth::JwtValidationError;
use crate::constants::{error_messages, limits};
use crate::errors::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::User;
use crate::server::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub jwt_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

/// Routes that do not require a bearer token
pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
}

/// Routes behind the auth middleware
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/me", axum::routing::get(me))
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let email = request.email.trim().to_lowercase();
    if !valid_email(&email) {
        return Err(AppError::invalid_input(error_messages::INVALID_EMAIL_FORMAT));
    }
    if request.password.len() < limits::MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(error_messages::PASSWORD_TOO_WEAK));
    }

    if state
        .database
        .get_user_by_email(&email)
        .await
        .map_err(|e| AppError::database(format!("Failed to check email: {e}")))?
        .is_some()
    {
        return Err(AppError::already_exists(error_messages::USER_ALREADY_EXISTS));
    }

    let password_hash = hash_password(request.password).await?;
    let user = User::new(email, password_hash, request.display_name);

    let user_id = state
        .database
        .create_user(&user)
        .await
        .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;

    tracing::info!(%user_id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            message: "Account created".into(),
        }),
    ))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = request.email.trim().to_lowercase();

    let user = state
        .database
        .get_user_by_email(&email)
        .await
        .map_err(|e| AppError::database(format!("Failed to load user: {e}")))?
        .ok_or_else(|| AppError::auth_invalid(error_messages::INVALID_CREDENTIALS))?;

    if !verify_password(request.password, user.password_hash.clone()).await? {
        return Err(AppError::auth_invalid(error_messages::INVALID_CREDENTIALS));
    }

    if !user.is_active {
        return Err(AppError::forbidden(error_messages::ACCOUNT_SUSPENDED));
    }

    state
        .database
        .update_last_active(user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to update last_active: {e}")))?;

    issue_token(&state, user)
}

/// `POST /api/auth/refresh`
///
/// Exchanges a still-valid token for a fresh one with a full lifetime.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<LoginResponse>> {
    let claims = state.auth.validate_token(&request.token).map_err(|e| match e {
        JwtValidationError::TokenExpired { .. } => AppError::auth_expired(),
        _ => AppError::auth_invalid("Invalid authentication token"),
    })?;

    let user_id = claims
        .user_id()
        .map_err(|_| AppError::auth_invalid("Invalid user ID in token"))?;

    let user = state
        .database
        .get_user(user_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load user: {e}")))?
        .ok_or_else(|| AppError::auth_invalid("Unknown user"))?;

    if !user.is_active {
        return Err(AppError::forbidden(error_messages::ACCOUNT_SUSPENDED));
    }

    issue_token(&state, user)
}

/// `GET /api/auth/me`
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<User>> {
    let user = state
        .database
        .get_user(auth_user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load user: {e}")))?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(Json(user))
}

fn issue_token(state: &AppState, user: User) -> AppResult<Json<LoginResponse>> {
    let jwt_token = state
        .auth
        .generate_token(&user)
        .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))?;
    let expires_at = Utc::now() + Duration::hours(state.auth.token_expiry_hours());

    Ok(Json(LoginResponse {
        jwt_token,
        expires_at,
        user,
    }))
}

/// bcrypt is CPU-bound, so hashing runs on the blocking pool
async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))
}

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(valid_email("athlete@example.com"));
        assert!(!valid_email("no-at-sign"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("user@nodot"));
        assert!(!valid_email("user@.com"));
    }
}
