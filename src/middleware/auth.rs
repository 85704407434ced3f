// ABOUTME: Request authentication middleware validating JWT bearer tokens
// ABOUTME: Loads the user, rejects suspended accounts, and injects AuthUser
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! Bearer-token authentication for `/api` routes
//!
//! The middleware validates the `Authorization: Bearer <jwt>` header, loads
//! the account to pick up role and suspension changes made after the token
//! was issued, and inserts an [`AuthUser`] extension for handlers.

use crate::auth::JwtValidationError;
use crate::constants::error_messages;
use crate::errors::AppError;
use crate::models::UserRole;
use crate::server::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use uuid::Uuid;

/// The authenticated caller, available to handlers as an extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Whether the caller may mutate catalogs and manage users
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Authenticate the request and inject [`AuthUser`]
///
/// # Errors
///
/// Returns 401 for missing/invalid/expired credentials and 403 for
/// suspended accounts.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AppError::auth_required)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::auth_invalid("Authorization header must be 'Bearer <token>'")
        })?;

    let claims = state.auth.validate_token(token).map_err(|e| match e {
        JwtValidationError::TokenExpired { .. } => AppError::auth_expired(),
        other => {
            tracing::debug!(error = %other, "token validation failed");
            AppError::auth_invalid("Invalid authentication token")
        }
    })?;

    let user_id = claims
        .user_id()
        .map_err(|_| AppError::auth_invalid("Invalid user ID in token"))?;

    // Reload the account so role changes and suspensions take effect
    // before the token expires
    let user = state
        .database
        .get_user(user_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load user: {e}")))?
        .ok_or_else(|| AppError::auth_invalid("Unknown user"))?;

    if !user.is_active {
        return Err(AppError::forbidden(error_messages::ACCOUNT_SUSPENDED));
    }

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(request).await)
}
