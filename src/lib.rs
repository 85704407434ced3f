// ABOUTME: Main library entry point for the Liftlog fitness tracking backend
// ABOUTME: Exposes REST endpoints for workouts, nutrition, catalogs, and dashboards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

#![deny(unsafe_code)]

//! # Liftlog Server
//!
//! A fitness-tracking REST backend: users register, maintain a profile (body
//! metrics, goals), build and log workouts against an exercise catalog, log
//! meals against a food catalog, track nutrition targets, and view dashboards.
//! An admin role manages catalogs and users; a trainer role publishes paid
//! courses.
//!
//! ## Architecture
//!
//! - **Routes**: thin axum handlers organized by domain under [`routes`]
//! - **Database**: `sqlx`/SQLite persistence split per domain under [`database`]
//! - **Metrics**: pure derived-metric calculators (BMR/TDEE macro targets,
//!   streaks, training volume) in [`metrics`]
//! - **Auth**: bcrypt + JWT bearer tokens in [`auth`], enforced by
//!   [`middleware`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use liftlog::config::ServerConfig;
//! use liftlog::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("liftlog configured for port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Authentication manager: JWT issuance and validation, password hashing
pub mod auth;

/// Environment-based configuration management
pub mod config;

/// Application constants: limits, error messages, macro ratio tables
pub mod constants;

/// Database layer: SQLite pool, migrations, per-domain queries
pub mod database;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// Production logging and structured output
pub mod logging;

/// Derived-metric calculators: macro targets, streaks, volume, deltas
pub mod metrics;

/// HTTP middleware for request authentication
pub mod middleware;

/// Common data models for users, catalogs, workouts, and nutrition
pub mod models;

/// Page-based pagination helpers for list endpoints
pub mod pagination;

/// HTTP routes organized by domain
pub mod routes;

/// Router composition and server lifecycle
pub mod server;
