// ABOUTME: Unauthenticated liveness endpoint
// ABOUTME: Reports service name and version for deploy checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

use crate::constants::service;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: service::NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}
