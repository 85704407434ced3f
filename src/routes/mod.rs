// ABOUTME: HTTP route modules for the JSON API
// ABOUTME: One module per domain; each exposes a Router merged in server.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # API Routes
//!
//! Handlers grouped per domain. Every module exposes a `router()` returning
//! an `axum::Router<Arc<AppState>>`; `server.rs` merges them and applies the
//! authentication middleware to everything under `/api` except registration
//! and login.

pub mod achievements;
pub mod admin;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod exercises;
pub mod foods;
pub mod health;
pub mod nutrition;
pub mod profile;
pub mod workout_logs;
pub mod workouts;
