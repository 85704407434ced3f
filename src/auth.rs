// ABOUTME: JWT-based user authentication and session token management
// ABOUTME: Handles token generation, validation, and claim extraction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Authentication and Session Management
//!
//! JWT-based authentication: the manager signs HS256 bearer tokens carrying
//! the user id, email, and role, and validates them with detailed expiry
//! diagnostics. Password hashing lives at the route layer (bcrypt via
//! `spawn_blocking`); this module only deals in tokens.

use crate::constants::{limits, service};
use crate::models::{User, UserRole};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired { current_time } => {
                write!(
                    f,
                    "JWT token expired (checked at {})",
                    current_time.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

/// `JWT` claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// User role, rechecked against the database on each request
    pub role: UserRole,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
}

impl Claims {
    /// Parse the subject claim as a user id
    ///
    /// # Errors
    ///
    /// Returns an error if the subject is not a valid UUID
    pub fn user_id(&self) -> Result<Uuid> {
        Ok(Uuid::parse_str(&self.sub)?)
    }
}

/// Authentication manager for `JWT` tokens
#[derive(Clone)]
pub struct AuthManager {
    jwt_secret: String,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(jwt_secret: impl Into<String>, token_expiry_hours: i64) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_expiry_hours: if token_expiry_hours > 0 {
                token_expiry_hours
            } else {
                limits::DEFAULT_SESSION_HOURS
            },
        }
    }

    /// Token lifetime applied at issuance
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Generate a signed `JWT` token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            aud: service::JWT_AUDIENCE.to_owned(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Validate a `JWT` token and return its claims
    ///
    /// # Errors
    ///
    /// Returns [`JwtValidationError`] when the token is expired, malformed,
    /// or carries an invalid signature.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[service::JWT_AUDIENCE]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtValidationError::TokenExpired {
                current_time: Utc::now(),
            },
            jsonwebtoken::errors::ErrorKind::InvalidSignature
            | jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                JwtValidationError::TokenInvalid {
                    reason: e.to_string(),
                }
            }
            _ => JwtValidationError::TokenMalformed {
                details: e.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(role: UserRole) -> User {
        let mut user = User::new("athlete@example.com".into(), "hash".into(), None);
        user.role = role;
        user
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let manager = AuthManager::new("test-secret", 24);
        let user = test_user(UserRole::Trainer);

        let token = manager.generate_token(&user).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, UserRole::Trainer);
        assert_eq!(claims.aud, service::JWT_AUDIENCE);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let manager = AuthManager::new("secret-a", 24);
        let token = manager.generate_token(&test_user(UserRole::User)).unwrap();

        let other = AuthManager::new("secret-b", 24);
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_malformed() {
        let manager = AuthManager::new("secret", 24);
        match manager.validate_token("not-a-jwt") {
            Err(JwtValidationError::TokenMalformed { .. }) => {}
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_expiry_falls_back_to_default() {
        let manager = AuthManager::new("secret", 0);
        assert_eq!(
            manager.token_expiry_hours(),
            limits::DEFAULT_SESSION_HOURS
        );
    }
}
