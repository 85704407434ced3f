// ABOUTME: HTTP server assembly: shared state, router composition, serving
// ABOUTME: Applies auth middleware to /api routes and tower-http layers globally
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Server Assembly
//!
//! Builds the shared [`AppState`], merges the per-domain routers, wires the
//! authentication middleware around everything under `/api` except
//! registration/login/refresh, and serves with graceful shutdown.

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::middleware::require_auth;
use crate::routes;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every handler
pub struct AppState {
    pub database: Database,
    pub auth: AuthManager,
    pub config: ServerConfig,
}

/// Build the full application router over the given state
pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(routes::health::health))
        .merge(routes::auth::public_router());

    let protected = Router::new()
        .merge(routes::auth::router())
        .merge(routes::profile::router())
        .merge(routes::exercises::router())
        .merge(routes::foods::router())
        .merge(routes::workouts::router())
        .merge(routes::workout_logs::router())
        .merge(routes::nutrition::router())
        .merge(routes::achievements::router())
        .merge(routes::dashboard::router())
        .merge(routes::admin::router())
        .merge(routes::courses::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let timeout = Duration::from_secs(state.config.http.request_timeout_secs);
    let cors = cors_layer(&state.config.http.cors_origins);

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Run the server until ctrl-c
///
/// # Errors
///
/// Returns an error if the database is unreachable after retries or the
/// listener cannot bind.
pub async fn run(config: ServerConfig) -> AppResult<()> {
    let database = Database::new(&config.database)
        .await
        .map_err(|e| AppError::database(format!("Failed to initialize database: {e}")))?;

    let auth = AuthManager::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiry_hours,
    );

    let addr = format!("{}:{}", config.host, config.http_port);
    let state = Arc::new(AppState {
        database,
        auth,
        config,
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("server stopped");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
    }
    info!("shutdown signal received");
}
