// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! Environment-based configuration management for production deployment

use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (sqlite file path or `sqlite::memory:`)
    pub url: String,
    /// Maximum pool connections
    pub max_connections: u32,
    /// Connection attempts before giving up (managed databases auto-suspend
    /// and need a few seconds to wake)
    pub connect_retries: u32,
    /// Initial backoff between connection attempts, doubled per retry
    pub connect_backoff_ms: u64,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for JWTs
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
}

/// HTTP-boundary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Allowed CORS origins; `*` means any
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Top-level server configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// HTTP bind address
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// Database settings
    pub database: DatabaseConfig,
    /// Auth settings
    pub auth: AuthConfig,
    /// HTTP boundary settings
    pub http: HttpConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error if a variable fails to parse, or if
    /// `JWT_SECRET` is missing in a production environment.
    pub fn from_env() -> AppResult<Self> {
        let environment =
            Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if environment.is_production() => {
                return Err(AppError::new(
                    crate::errors::ErrorCode::ConfigMissing,
                    "JWT_SECRET must be set in production",
                ));
            }
            _ => {
                warn!("JWT_SECRET not set; using insecure development secret");
                "liftlog-dev-secret".into()
            }
        };

        let config = Self {
            http_port: parse_var("HTTP_PORT", 8081)?,
            host: env_var_or("HOST", "127.0.0.1"),
            environment,
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", "sqlite:data/liftlog.db"),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
                connect_retries: parse_var("DATABASE_CONNECT_RETRIES", 5)?,
                connect_backoff_ms: parse_var("DATABASE_CONNECT_BACKOFF_MS", 500)?,
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: parse_var("JWT_EXPIRY_HOURS", limits::DEFAULT_SESSION_HOURS)?,
            },
            http: HttpConfig {
                cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", "*")),
                request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", 30)?,
            },
        };

        Ok(config)
    }
}

/// Read an environment variable with a default fallback
fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Read and parse an environment variable with a default fallback
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::config(format!("{name} is invalid: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated origin list
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing_accepts_aliases() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("TEST"),
            Environment::Testing
        );
        assert_eq!(
            Environment::from_str_or_default("anything"),
            Environment::Development
        );
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let origins = parse_origins("https://a.example, https://b.example ,");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }
}
