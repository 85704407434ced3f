// ABOUTME: HTTP-level integration tests exercising the full router
// ABOUTME: Auth flow, role gates, ownership scoping, and the calculators

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use liftlog::auth::AuthManager;
use liftlog::config::{
    AuthConfig, DatabaseConfig, Environment, HttpConfig, ServerConfig,
};
use liftlog::database::Database;
use liftlog::models::{User, UserRole};
use liftlog::server::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn setup() -> (Router, Arc<AppState>) {
    let config = ServerConfig {
        http_port: 0,
        host: "127.0.0.1".into(),
        environment: Environment::Testing,
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            connect_retries: 0,
            connect_backoff_ms: 10,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".into(),
            jwt_expiry_hours: 24,
        },
        http: HttpConfig {
            cors_origins: vec!["*".into()],
            request_timeout_secs: 30,
        },
    };

    let database = Database::connect(&config.database.url).await.unwrap();
    let auth = AuthManager::new(config.auth.jwt_secret.clone(), config.auth.jwt_expiry_hours);
    let state = Arc::new(AppState {
        database,
        auth,
        config,
    });
    (build_router(state.clone()), state)
}

/// Insert a user with the given role and mint a token for them
async fn user_with_role(state: &AppState, email: &str, role: UserRole) -> (User, String) {
    let mut user = User::new(email.into(), "not-a-real-hash".into(), None);
    user.role = role;
    state.database.create_user(&user).await.unwrap();
    let token = state.auth.generate_token(&user).unwrap();
    (user, token)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));
    builder.body(body).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = setup().await;
    let response = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "liftlog-server");
}

#[tokio::test]
async fn api_routes_require_a_token() {
    let (app, _) = setup().await;
    let response = app
        .clone()
        .oneshot(request("GET", "/api/dashboard", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request("GET", "/api/dashboard", Some("garbage"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_me_flow() {
    let (app, _) = setup().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "email": "athlete@example.com",
                "password": "hunter2hunter2",
                "display_name": "Athlete"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same email again conflicts
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "athlete@example.com", "password": "hunter2hunter2" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Wrong password and unknown email are indistinguishable
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "athlete@example.com", "password": "wrong-password" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(response).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "wrong-password" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_email = body_json(response).await;
    assert_eq!(
        wrong_password["error"]["message"],
        unknown_email["error"]["message"]
    );

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "athlete@example.com", "password": "hunter2hunter2" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login = body_json(response).await;
    let token = login["jwt_token"].as_str().unwrap().to_owned();
    assert!(login["user"].get("password_hash").is_none());

    let response = app
        .oneshot(request("GET", "/api/auth/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["email"], "athlete@example.com");
}

#[tokio::test]
async fn weak_passwords_and_bad_emails_rejected() {
    let (app, _) = setup().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "a@example.com", "password": "short" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "not-an-email", "password": "hunter2hunter2" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn catalog_mutation_is_admin_only() {
    let (app, state) = setup().await;
    let (_, user_token) = user_with_role(&state, "user@example.com", UserRole::User).await;
    let (_, admin_token) = user_with_role(&state, "admin@example.com", UserRole::Admin).await;

    let exercise = json!({
        "name": "Bench Press",
        "muscle_group": "chest",
        "difficulty": "intermediate"
    });

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/exercises",
            Some(&user_token),
            Some(exercise.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/exercises",
            Some(&admin_token),
            Some(exercise),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;

    // Reads stay open to everyone
    let uri = format!("/api/exercises/{}", created["id"].as_str().unwrap());
    let response = app
        .oneshot(request("GET", &uri, Some(&user_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn foreign_workout_mutation_looks_like_absence() {
    let (app, state) = setup().await;
    let (_, owner_token) = user_with_role(&state, "owner@example.com", UserRole::User).await;
    let (_, other_token) = user_with_role(&state, "other@example.com", UserRole::User).await;
    let (_, admin_token) = user_with_role(&state, "admin@example.com", UserRole::Admin).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/workouts",
            Some(&owner_token),
            Some(json!({ "name": "Push Day", "exercises": [] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let workout = body_json(response).await;
    let uri = format!("/api/workouts/{}", workout["id"].as_str().unwrap());

    let rename = json!({ "name": "Stolen" });

    let response = app
        .clone()
        .oneshot(request("PATCH", &uri, Some(&other_token), Some(rename.clone())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request("GET", &uri, Some(&other_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Admins can still manage any workout
    let response = app
        .clone()
        .oneshot(request("PATCH", &uri, Some(&admin_token), Some(rename)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", &uri, Some(&owner_token), None))
        .await
        .unwrap();
    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Stolen");
}

#[tokio::test]
async fn template_creation_requires_admin() {
    let (app, state) = setup().await;
    let (_, user_token) = user_with_role(&state, "user@example.com", UserRole::User).await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/workouts",
            Some(&user_token),
            Some(json!({ "name": "Template", "is_template": true, "exercises": [] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn nutrition_log_scales_from_per_100g() {
    let (app, state) = setup().await;
    let (_, user_token) = user_with_role(&state, "user@example.com", UserRole::User).await;
    let (_, admin_token) = user_with_role(&state, "admin@example.com", UserRole::Admin).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/foods",
            Some(&admin_token),
            Some(json!({
                "name": "Rice Cake",
                "calories_per_100g": 100.0,
                "protein_per_100g": 8.0,
                "carbs_per_100g": 80.0,
                "fat_per_100g": 3.0
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let food = body_json(response).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/nutrition",
            Some(&user_token),
            Some(json!({
                "food_id": food["id"],
                "meal_type": "snack",
                "quantity_g": 150.0
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let log = body_json(response).await;
    assert!((log["calories"].as_f64().unwrap() - 150.0).abs() < f64::EPSILON);
    assert!((log["protein_g"].as_f64().unwrap() - 12.0).abs() < f64::EPSILON);

    // Oversized and zero quantities are rejected
    let response = app
        .oneshot(request(
            "POST",
            "/api/nutrition",
            Some(&user_token),
            Some(json!({
                "food_id": food["id"],
                "meal_type": "snack",
                "quantity_g": 0.0
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn macro_targets_need_a_profile_and_match_the_table() {
    let (app, state) = setup().await;
    let (_, token) = user_with_role(&state, "user@example.com", UserRole::User).await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/nutrition/targets", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/profile",
            Some(&token),
            Some(json!({
                "age": 30,
                "sex": "male",
                "height_cm": 180.0,
                "weight_kg": 80.0,
                "activity_level": "moderate",
                "goal": "lose_weight"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/nutrition/targets", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let targets = body_json(response).await;
    assert!((targets["protein_g"].as_f64().unwrap() - 176.0).abs() < f64::EPSILON);
    assert!((targets["fat_g"].as_f64().unwrap() - 72.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn session_lifecycle_over_http() {
    let (app, state) = setup().await;
    let (_, user_token) = user_with_role(&state, "user@example.com", UserRole::User).await;
    let (_, admin_token) = user_with_role(&state, "admin@example.com", UserRole::Admin).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/exercises",
            Some(&admin_token),
            Some(json!({ "name": "Squat", "muscle_group": "legs", "difficulty": "hard" })),
        ))
        .await
        .unwrap();
    let exercise = body_json(response).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/workouts",
            Some(&user_token),
            Some(json!({
                "name": "Leg Day",
                "exercises": [{ "exercise_id": exercise["id"], "sets": 3, "reps": 5 }]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let workout = body_json(response).await;

    let start = json!({ "workout_id": workout["id"] });
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/workout-logs",
            Some(&user_token),
            Some(start.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let session = body_json(response).await;
    let session_id = session["id"].as_str().unwrap().to_owned();
    assert_eq!(session["current_exercise"], 0);
    assert_eq!(session["exercises"].as_array().unwrap().len(), 1);

    // Second start for the same workout conflicts
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/workout-logs",
            Some(&user_token),
            Some(start),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Progress pointer advances within bounds
    let uri = format!("/api/workout-logs/{session_id}/progress");
    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &uri,
            Some(&user_token),
            Some(json!({ "current_exercise": 0, "current_set": 2 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &uri,
            Some(&user_token),
            Some(json!({ "current_exercise": 5, "current_set": 0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Rest timer bounds
    let rest_uri = format!("/api/workout-logs/{session_id}/rest");
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &rest_uri,
            Some(&user_token),
            Some(json!({ "seconds": 90 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &rest_uri,
            Some(&user_token),
            Some(json!({ "seconds": 0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Completion stamps completed_at and whole-minute duration, and awards
    // the first-workout achievement
    let complete_uri = format!("/api/workout-logs/{session_id}/complete");
    let response = app
        .clone()
        .oneshot(request("POST", &complete_uri, Some(&user_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let completed = body_json(response).await;
    assert!(!completed["completed_at"].is_null());
    assert_eq!(completed["duration_minutes"], 0);
    let codes: Vec<&str> = completed["new_achievements"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["code"].as_str())
        .collect();
    assert!(codes.contains(&"first_workout"));

    // A completed session rejects further mutation
    let response = app
        .oneshot(request(
            "PATCH",
            &uri,
            Some(&user_token),
            Some(json!({ "current_exercise": 0, "current_set": 0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_session_rejects_progress_updates() {
    let (app, state) = setup().await;
    let (_, token) = user_with_role(&state, "user@example.com", UserRole::User).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/workouts",
            Some(&token),
            Some(json!({ "name": "Placeholder", "exercises": [] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let workout = body_json(response).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/workout-logs",
            Some(&token),
            Some(json!({ "workout_id": workout["id"] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let session = body_json(response).await;

    // No exercise index is valid when the workout has no exercises
    let uri = format!(
        "/api/workout-logs/{}/progress",
        session["id"].as_str().unwrap()
    );
    let response = app
        .oneshot(request(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({ "current_exercise": 0, "current_set": 0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_cannot_suspend_self() {
    let (app, state) = setup().await;
    let (admin, admin_token) = user_with_role(&state, "admin@example.com", UserRole::Admin).await;
    let (victim, _) = user_with_role(&state, "victim@example.com", UserRole::User).await;

    let uri = format!("/api/admin/users/{}/suspend", admin.id);
    let response = app
        .clone()
        .oneshot(request("POST", &uri, Some(&admin_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/admin/users/{}/suspend", victim.id);
    let response = app
        .clone()
        .oneshot(request("POST", &uri, Some(&admin_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Suspended users are rejected by the middleware on their next request
    let victim_token = state.auth.generate_token(&victim).unwrap();
    let response = app
        .oneshot(request("GET", "/api/dashboard", Some(&victim_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn course_authoring_requires_trainer_role() {
    let (app, state) = setup().await;
    let (_, user_token) = user_with_role(&state, "user@example.com", UserRole::User).await;
    let (_, trainer_token) =
        user_with_role(&state, "trainer@example.com", UserRole::Trainer).await;
    let (_, other_trainer_token) =
        user_with_role(&state, "trainer2@example.com", UserRole::Trainer).await;

    let course = json!({ "title": "Starting Strength", "price_cents": 4999 });

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/courses",
            Some(&user_token),
            Some(course.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/courses",
            Some(&trainer_token),
            Some(course),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap();

    // Unpublished courses hide from everyone but the author and admins
    let uri = format!("/api/courses/{id}");
    let response = app
        .clone()
        .oneshot(request("GET", &uri, Some(&user_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Another trainer cannot publish it either
    let publish_uri = format!("/api/courses/{id}/publish");
    let response = app
        .clone()
        .oneshot(request("POST", &publish_uri, Some(&other_trainer_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request("POST", &publish_uri, Some(&trainer_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Published courses are visible to all users
    let response = app
        .oneshot(request("GET", &uri, Some(&user_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
