// ABOUTME: Common data models for users, catalogs, workouts, and nutrition
// ABOUTME: Defines the relational entities and their enums shared across layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Data Models
//!
//! Relational entities owned and mutated through the database layer: users
//! and profiles, the exercise and food catalogs, workouts and their session
//! logs, nutrition logs, achievements, and trainer courses.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Role gating mutation endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user
    User,
    /// Can author and publish paid courses
    Trainer,
    /// Manages catalogs and users
    Admin,
}

impl UserRole {
    /// Database representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Trainer => "trainer",
            Self::Admin => "admin",
        }
    }

    /// Whether this role may mutate catalogs and manage users
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role may author courses
    #[must_use]
    pub const fn can_publish_courses(&self) -> bool {
        matches!(self, Self::Trainer | Self::Admin)
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "trainer" => Ok(Self::Trainer),
            "admin" => Ok(Self::Admin),
            other => Err(anyhow!("Unknown user role: {other}")),
        }
    }
}

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    /// Suspended users cannot log in
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new regular user with freshly generated id
    #[must_use]
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            password_hash,
            role: UserRole::User,
            is_active: true,
            created_at: now,
            last_active: now,
        }
    }
}

/// Biological sex, used by the BMR formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(anyhow!("Unknown sex: {other}")),
        }
    }
}

/// Weekly activity level, maps to a TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Active => "active",
            Self::VeryActive => "very_active",
        }
    }

    /// TDEE multiplier applied to BMR
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(Self::Sedentary),
            "light" => Ok(Self::Light),
            "moderate" => Ok(Self::Moderate),
            "active" => Ok(Self::Active),
            "very_active" => Ok(Self::VeryActive),
            other => Err(anyhow!("Unknown activity level: {other}")),
        }
    }
}

/// Fitness goal, keys the macro-ratio table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    LoseWeight,
    Maintain,
    GainMuscle,
}

impl FitnessGoal {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoseWeight => "lose_weight",
            Self::Maintain => "maintain",
            Self::GainMuscle => "gain_muscle",
        }
    }
}

impl FromStr for FitnessGoal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lose_weight" => Ok(Self::LoseWeight),
            "maintain" => Ok(Self::Maintain),
            "gain_muscle" => Ok(Self::GainMuscle),
            other => Err(anyhow!("Unknown fitness goal: {other}")),
        }
    }
}

/// Body metrics and goal for a user, input to the target calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub age: i64,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal: FitnessGoal,
    pub updated_at: DateTime<Utc>,
}

/// Catalog exercise maintained by admins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub muscle_group: String,
    pub equipment: Option<String>,
    pub difficulty: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Catalog food with per-100g macros, maintained by admins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    pub created_at: DateTime<Utc>,
}

/// A workout definition: user-owned, or an admin-authored reusable template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    /// None for admin templates visible to everyone
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub is_template: bool,
    pub created_at: DateTime<Utc>,
    pub exercises: Vec<WorkoutExercise>,
}

/// An ordered exercise entry inside a workout definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub position: i64,
    pub sets: i64,
    pub reps: i64,
    pub rest_seconds: i64,
    pub target_weight_kg: Option<f64>,
}

/// A per-session record of a user performing a workout
///
/// Holds the resumable progress pointer (current exercise/set) and an
/// optional rest-until timestamp for the rest-timer countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Elapsed whole minutes, set on completion
    pub duration_minutes: Option<i64>,
    pub current_exercise: i64,
    pub current_set: i64,
    pub rest_until: Option<DateTime<Utc>>,
}

impl WorkoutLog {
    /// Whether this session is still in progress
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.completed_at.is_none()
    }
}

/// One exercise performed within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub id: Uuid,
    pub workout_log_id: Uuid,
    pub exercise_id: Uuid,
    pub position: i64,
    pub sets: Vec<SetLog>,
}

/// One completed set within an exercise log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLog {
    pub id: Uuid,
    pub exercise_log_id: Uuid,
    pub set_number: i64,
    pub reps: i64,
    pub weight_kg: f64,
    pub logged_at: DateTime<Utc>,
}

/// Meal slot for a nutrition log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

impl FromStr for MealType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            other => Err(anyhow!("Unknown meal type: {other}")),
        }
    }
}

/// A logged meal with macros computed from the food's per-100g values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub meal_type: MealType,
    pub quantity_g: f64,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub logged_at: DateTime<Utc>,
}

/// An earned achievement, unique per (user, code)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub title: String,
    pub earned_at: DateTime<Utc>,
}

/// A paid course authored by a trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Stored price; checkout is out of scope
    pub price_cents: i64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [UserRole::User, UserRole::Trainer, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
    }

    #[test]
    fn role_gates() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Trainer.is_admin());
        assert!(UserRole::Trainer.can_publish_courses());
        assert!(!UserRole::User.can_publish_courses());
    }

    #[test]
    fn new_user_defaults() {
        let user = User::new("a@b.co".into(), "hash".into(), None);
        assert_eq!(user.role, UserRole::User);
        assert!(user.is_active);
    }

    #[test]
    fn activity_multipliers_increase() {
        assert!(ActivityLevel::Sedentary.multiplier() < ActivityLevel::VeryActive.multiplier());
    }
}
