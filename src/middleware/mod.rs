// ABOUTME: HTTP middleware modules for the request pipeline
// ABOUTME: Currently bearer-token authentication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! Request middleware

/// Bearer-token authentication middleware
pub mod auth;

pub use auth::{require_auth, AuthUser};
