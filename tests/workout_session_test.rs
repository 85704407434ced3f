// ABOUTME: Integration tests for the workout session lifecycle
// ABOUTME: Progress pointer, rest timer, set logs, completion, achievements

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use liftlog::database::Database;
use liftlog::models::{Achievement, Exercise, SetLog, User, Workout, WorkoutExercise, WorkoutLog};
use uuid::Uuid;

async fn test_db() -> Database {
    Database::connect("sqlite::memory:").await.unwrap()
}

struct Fixture {
    db: Database,
    user: User,
    workout: Workout,
}

async fn fixture() -> Fixture {
    let db = test_db().await;
    let user = User::new("lifter@example.com".into(), "hash".into(), None);
    db.create_user(&user).await.unwrap();

    let exercise = Exercise {
        id: Uuid::new_v4(),
        name: "Squat".into(),
        muscle_group: "legs".into(),
        equipment: None,
        difficulty: "intermediate".into(),
        description: None,
        created_at: Utc::now(),
    };
    db.create_exercise(&exercise).await.unwrap();

    let workout_id = Uuid::new_v4();
    let workout = Workout {
        id: workout_id,
        owner_id: Some(user.id),
        name: "Leg Day".into(),
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
            rest_seconds: 180,
            target_weight_kg: Some(120.0),
        }],
    };
    db.create_workout(&workout).await.unwrap();

    Fixture { db, user, workout }
}

fn new_log(user_id: Uuid, workout_id: Uuid) -> WorkoutLog {
    WorkoutLog {
        id: Uuid::new_v4(),
        user_id,
        workout_id,
        started_at: Utc::now(),
        completed_at: None,
        duration_minutes: None,
        current_exercise: 0,
        current_set: 0,
        rest_until: None,
    }
}

#[tokio::test]
async fn session_start_creates_exercise_logs() {
    let f = fixture().await;
    let log = new_log(f.user.id, f.workout.id);
    let rows: Vec<(Uuid, i64)> = f
        .workout
        .exercises
        .iter()
        .map(|e| (e.exercise_id, e.position))
        .collect();

    f.db.create_workout_log(&log, &rows).await.unwrap();

    assert!(f
        .db
        .has_active_session(f.user.id, f.workout.id)
        .await
        .unwrap());
    assert_eq!(f.db.exercise_count_for_log(log.id).await.unwrap(), 1);

    let active = f.db.get_active_workout_log(f.user.id).await.unwrap().unwrap();
    assert_eq!(active.id, log.id);
    assert_eq!(active.current_exercise, 0);
    assert_eq!(active.current_set, 0);
    assert!(active.is_active());
}

#[tokio::test]
async fn progress_update_clears_rest_timer() {
    let f = fixture().await;
    let log = new_log(f.user.id, f.workout.id);
    f.db.create_workout_log(&log, &[(f.workout.exercises[0].exercise_id, 0)])
        .await
        .unwrap();

    let rest_until = Utc::now() + Duration::seconds(120);
    f.db.set_rest_until(log.id, rest_until).await.unwrap();
    let loaded = f.db.get_workout_log(log.id, f.user.id).await.unwrap().unwrap();
    assert!(loaded.rest_until.is_some());

    f.db.update_progress(log.id, 0, 2).await.unwrap();
    let loaded = f.db.get_workout_log(log.id, f.user.id).await.unwrap().unwrap();
    assert_eq!(loaded.current_set, 2);
    assert!(loaded.rest_until.is_none());
}

#[tokio::test]
async fn completion_stamps_duration_and_clears_state() {
    let f = fixture().await;
    let mut log = new_log(f.user.id, f.workout.id);
    log.started_at = Utc::now() - Duration::minutes(42);
    f.db.create_workout_log(&log, &[(f.workout.exercises[0].exercise_id, 0)])
        .await
        .unwrap();

    let completed_at = Utc::now();
    let duration = (completed_at - log.started_at).num_minutes();
    f.db.complete_workout_log(log.id, completed_at, duration)
        .await
        .unwrap();

    let loaded = f.db.get_workout_log(log.id, f.user.id).await.unwrap().unwrap();
    assert!(!loaded.is_active());
    assert!(loaded.completed_at.is_some());
    assert_eq!(loaded.duration_minutes, Some(42));
    assert!(loaded.rest_until.is_none());

    assert!(!f
        .db
        .has_active_session(f.user.id, f.workout.id)
        .await
        .unwrap());
    assert_eq!(f.db.count_completed_sessions(f.user.id).await.unwrap(), 1);
    assert_eq!(f.db.completed_session_days(f.user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn set_logs_accumulate_training_volume() {
    let f = fixture().await;
    let log = new_log(f.user.id, f.workout.id);
    f.db.create_workout_log(&log, &[(f.workout.exercises[0].exercise_id, 0)])
        .await
        .unwrap();

    let exercise_logs = f.db.get_exercise_logs(log.id).await.unwrap();
    assert_eq!(exercise_logs.len(), 1);
    let exercise_log_id = exercise_logs[0].id;

    assert!(f
        .db
        .exercise_log_in_session(exercise_log_id, log.id)
        .await
        .unwrap());
    assert!(!f
        .db
        .exercise_log_in_session(Uuid::new_v4(), log.id)
        .await
        .unwrap());

    for set_number in 1..=3 {
        f.db.create_set_log(&SetLog {
            id: Uuid::new_v4(),
            exercise_log_id,
            set_number,
            reps: 5,
            weight_kg: 100.0,
            logged_at: Utc::now(),
        })
        .await
        .unwrap();
    }

    let with_sets = f.db.get_exercise_logs(log.id).await.unwrap();
    assert_eq!(with_sets[0].sets.len(), 3);
    assert_eq!(with_sets[0].sets[0].set_number, 1);

    let from = Utc::now() - Duration::hours(1);
    let to = Utc::now() + Duration::hours(1);
    let volume = f
        .db
        .training_volume_between(f.user.id, from, to)
        .await
        .unwrap();
    // 3 sets x 5 reps x 100 kg
    assert!((volume - 1500.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn sessions_are_owner_scoped() {
    let f = fixture().await;
    let stranger = User::new("stranger@example.com".into(), "hash".into(), None);
    f.db.create_user(&stranger).await.unwrap();

    let log = new_log(f.user.id, f.workout.id);
    f.db.create_workout_log(&log, &[]).await.unwrap();

    assert!(f.db.get_workout_log(log.id, f.user.id).await.unwrap().is_some());
    assert!(f
        .db
        .get_workout_log(log.id, stranger.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn achievement_awards_are_idempotent() {
    let f = fixture().await;
    let achievement = Achievement {
        id: Uuid::new_v4(),
        user_id: f.user.id,
        code: "first_workout".into(),
        title: "First workout completed".into(),
        earned_at: Utc::now(),
    };

    assert!(f.db.award_achievement(&achievement).await.unwrap());

    let repeat = Achievement {
        id: Uuid::new_v4(),
        ..achievement.clone()
    };
    assert!(!f.db.award_achievement(&repeat).await.unwrap());

    let earned = f.db.list_achievements(f.user.id).await.unwrap();
    assert_eq!(earned.len(), 1);
    assert_eq!(earned[0].code, "first_workout");
}
