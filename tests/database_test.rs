// ABOUTME: Integration tests for user, catalog, and workout persistence
// ABOUTME: Runs against an in-memory SQLite pool with migrations applied

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use liftlog::config::DatabaseConfig;
use liftlog::database::{Database, ExerciseFilter};
use liftlog::models::{
    ActivityLevel, Exercise, FitnessGoal, Sex, User, UserProfile, UserRole, Workout,
    WorkoutExercise,
};
use liftlog::pagination::PageQuery;
use uuid::Uuid;

async fn test_db() -> Database {
    Database::connect("sqlite::memory:").await.unwrap()
}

fn test_user(email: &str) -> User {
    User::new(email.into(), "bcrypt-hash".into(), Some("Test".into()))
}

fn test_exercise(name: &str) -> Exercise {
    Exercise {
        id: Uuid::new_v4(),
        name: name.into(),
        muscle_group: "chest".into(),
        equipment: Some("barbell".into()),
        difficulty: "intermediate".into(),
        description: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn file_backed_database_is_created_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("liftlog-test.db");
    let config = DatabaseConfig {
        url: format!("sqlite:{}", path.display()),
        max_connections: 1,
        connect_retries: 0,
        connect_backoff_ms: 10,
    };

    let db = Database::new(&config).await.unwrap();
    db.create_user(&test_user("file@example.com")).await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn user_round_trip_and_duplicate_email() {
    let db = test_db().await;
    let user = test_user("a@example.com");

    db.create_user(&user).await.unwrap();
    let loaded = db.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(loaded.email, "a@example.com");
    assert_eq!(loaded.role, UserRole::User);
    assert!(loaded.is_active);

    let by_email = db.get_user_by_email("a@example.com").await.unwrap();
    assert!(by_email.is_some());

    // Second account with the same email is rejected
    let dup = test_user("a@example.com");
    assert!(db.create_user(&dup).await.is_err());
}

#[tokio::test]
async fn suspend_activate_and_delete_user() {
    let db = test_db().await;
    let user = test_user("b@example.com");
    db.create_user(&user).await.unwrap();

    db.set_user_active(user.id, false).await.unwrap();
    assert!(!db.get_user(user.id).await.unwrap().unwrap().is_active);

    db.set_user_active(user.id, true).await.unwrap();
    assert!(db.get_user(user.id).await.unwrap().unwrap().is_active);

    // Toggling a missing user errors instead of silently succeeding
    assert!(db.set_user_active(Uuid::new_v4(), false).await.is_err());

    assert!(db.delete_user(user.id).await.unwrap());
    assert!(db.get_user(user.id).await.unwrap().is_none());
    assert!(!db.delete_user(user.id).await.unwrap());
}

#[tokio::test]
async fn list_users_filters_by_active() {
    let db = test_db().await;
    let active = test_user("active@example.com");
    let suspended = test_user("gone@example.com");
    db.create_user(&active).await.unwrap();
    db.create_user(&suspended).await.unwrap();
    db.set_user_active(suspended.id, false).await.unwrap();

    let page = PageQuery::default();
    let (all, total) = db.list_users(None, &page).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(all.len(), 2);

    let (only_active, total) = db.list_users(Some(true), &page).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(only_active[0].id, active.id);
}

#[tokio::test]
async fn profile_upsert_overwrites() {
    let db = test_db().await;
    let user = test_user("c@example.com");
    db.create_user(&user).await.unwrap();

    assert!(db.get_profile(user.id).await.unwrap().is_none());

    let mut profile = UserProfile {
        user_id: user.id,
        age: 30,
        sex: Sex::Male,
        height_cm: 180.0,
        weight_kg: 80.0,
        activity_level: ActivityLevel::Moderate,
        goal: FitnessGoal::LoseWeight,
        updated_at: Utc::now(),
    };
    db.upsert_profile(&profile).await.unwrap();

    profile.weight_kg = 78.5;
    profile.goal = FitnessGoal::Maintain;
    db.upsert_profile(&profile).await.unwrap();

    let loaded = db.get_profile(user.id).await.unwrap().unwrap();
    assert!((loaded.weight_kg - 78.5).abs() < f64::EPSILON);
    assert_eq!(loaded.goal, FitnessGoal::Maintain);
}

#[tokio::test]
async fn exercise_filter_matches_search_and_group() {
    let db = test_db().await;
    let bench = test_exercise("Bench Press");
    let mut squat = test_exercise("Back Squat");
    squat.muscle_group = "legs".into();
    db.create_exercise(&bench).await.unwrap();
    db.create_exercise(&squat).await.unwrap();

    let page = PageQuery::default();

    let filter = ExerciseFilter {
        search: Some("Bench".into()),
        ..Default::default()
    };
    let (found, total) = db.list_exercises(&filter, &page).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].id, bench.id);

    let filter = ExerciseFilter {
        muscle_group: Some("legs".into()),
        ..Default::default()
    };
    let (found, _) = db.list_exercises(&filter, &page).await.unwrap();
    assert_eq!(found[0].id, squat.id);

    let (all, total) = db
        .list_exercises(&ExerciseFilter::default(), &page)
        .await
        .unwrap();
    assert_eq!(total, 2);
    // Alphabetical ordering
    assert_eq!(all[0].name, "Back Squat");
}

#[tokio::test]
async fn workout_visibility_own_and_templates_only() {
    let db = test_db().await;
    let owner = test_user("owner@example.com");
    let other = test_user("other@example.com");
    db.create_user(&owner).await.unwrap();
    db.create_user(&other).await.unwrap();

    let exercise = test_exercise("Deadlift");
    db.create_exercise(&exercise).await.unwrap();

    let workout_id = Uuid::new_v4();
    let workout = Workout {
        id: workout_id,
        owner_id: Some(owner.id),
        name: "Pull Day".into(),
        description: None,
        is_template: false,
        created_at: Utc::now(),
        exercises: vec![WorkoutExercise {
            id: Uuid::new_v4(),
            workout_id,
            exercise_id: exercise.id,
            position: 0,
            sets: 3,
            reps: 5,
            rest_seconds: 120,
            target_weight_kg: Some(100.0),
        }],
    };
    db.create_workout(&workout).await.unwrap();

    let template_id = Uuid::new_v4();
    let template = Workout {
        id: template_id,
        owner_id: None,
        name: "Starter Template".into(),
        description: None,
        is_template: true,
        created_at: Utc::now(),
        exercises: vec![],
    };
    db.create_workout(&template).await.unwrap();

    // Owner sees their workout with its exercise rows
    let loaded = db
        .get_workout_for_user(workout_id, owner.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.exercises.len(), 1);
    assert_eq!(loaded.exercises[0].exercise_id, exercise.id);

    // Another user cannot see it, but can see the template
    assert!(db
        .get_workout_for_user(workout_id, other.id)
        .await
        .unwrap()
        .is_none());
    assert!(db
        .get_workout_for_user(template_id, other.id)
        .await
        .unwrap()
        .is_some());

    let mine = db.list_workouts_for_user(other.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!(mine[0].is_template);
}

#[tokio::test]
async fn workout_update_replaces_exercise_list() {
    let db = test_db().await;
    let owner = test_user("replace@example.com");
    db.create_user(&owner).await.unwrap();

    let a = test_exercise("Row");
    let b = test_exercise("Pulldown");
    db.create_exercise(&a).await.unwrap();
    db.create_exercise(&b).await.unwrap();

    assert!(db.exercises_exist(&[a.id, b.id]).await.unwrap());
    assert!(!db.exercises_exist(&[a.id, Uuid::new_v4()]).await.unwrap());

    let workout_id = Uuid::new_v4();
    let mut workout = Workout {
        id: workout_id,
        owner_id: Some(owner.id),
        name: "Back Day".into(),
        description: None,
        is_template: false,
        created_at: Utc::now(),
        exercises: vec![WorkoutExercise {
            id: Uuid::new_v4(),
            workout_id,
            exercise_id: a.id,
            position: 0,
            sets: 3,
            reps: 8,
            rest_seconds: 90,
            target_weight_kg: None,
        }],
    };
    db.create_workout(&workout).await.unwrap();

    workout.name = "Back Day v2".into();
    workout.exercises = vec![
        WorkoutExercise {
            id: Uuid::new_v4(),
            workout_id,
            exercise_id: b.id,
            position: 0,
            sets: 4,
            reps: 10,
            rest_seconds: 60,
            target_weight_kg: None,
        },
        WorkoutExercise {
            id: Uuid::new_v4(),
            workout_id,
            exercise_id: a.id,
            position: 1,
            sets: 3,
            reps: 8,
            rest_seconds: 90,
            target_weight_kg: None,
        },
    ];
    db.update_workout(&workout).await.unwrap();

    let loaded = db.get_workout(workout_id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Back Day v2");
    assert_eq!(loaded.exercises.len(), 2);
    assert_eq!(loaded.exercises[0].exercise_id, b.id);
    assert_eq!(loaded.exercises[1].exercise_id, a.id);
}
