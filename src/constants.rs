// ABOUTME: Application constants and configuration values
// ABOUTME: Centralizes limits, validation bounds, and error message strings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! Application-wide constants

/// Service identity for logging and token audiences
pub mod service {
    /// Canonical service name
    pub const NAME: &str = "liftlog-server";
    /// Audience claim embedded in issued JWTs
    pub const JWT_AUDIENCE: &str = "liftlog";
}

/// Numeric limits and validation bounds
pub mod limits {
    /// Default JWT session lifetime in hours
    pub const DEFAULT_SESSION_HOURS: i64 = 24;
    /// Minimum accepted password length
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Default page size for list endpoints
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    /// Hard cap on page size for list endpoints
    pub const MAX_PAGE_SIZE: u32 = 100;
    /// Profile validation bounds
    pub const MIN_AGE: i64 = 13;
    pub const MAX_AGE: i64 = 120;
    pub const MIN_HEIGHT_CM: f64 = 80.0;
    pub const MAX_HEIGHT_CM: f64 = 260.0;
    pub const MIN_WEIGHT_KG: f64 = 25.0;
    pub const MAX_WEIGHT_KG: f64 = 400.0;
    /// Largest single nutrition log entry in grams
    pub const MAX_FOOD_QUANTITY_G: f64 = 5000.0;
    /// Rest timer bounds in seconds
    pub const MIN_REST_SECONDS: i64 = 1;
    pub const MAX_REST_SECONDS: i64 = 600;
    /// Calorie floor applied after goal adjustment
    pub const MIN_DAILY_CALORIES: f64 = 1200.0;
}

/// Shared error message strings
pub mod error_messages {
    pub const INVALID_EMAIL_FORMAT: &str = "Invalid email format";
    pub const PASSWORD_TOO_WEAK: &str = "Password must be at least 8 characters";
    pub const USER_ALREADY_EXISTS: &str = "A user with this email already exists";
    pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
    pub const ACCOUNT_SUSPENDED: &str = "Account is suspended";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_bounds_are_sane() {
        assert!(limits::DEFAULT_PAGE_SIZE <= limits::MAX_PAGE_SIZE);
    }
}
