// ABOUTME: Derived-metric calculators for macro targets, streaks, and deltas
// ABOUTME: Pure arithmetic over profile data and session history, no I/O
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! # Derived Metrics
//!
//! Stateless calculators backing the nutrition-targets endpoint and the
//! dashboard: Mifflin–St Jeor BMR, activity-scaled TDEE, the per-kilogram
//! macro-ratio table keyed by fitness goal, workout streaks, and
//! percentage deltas.

use crate::constants::limits;
use crate::models::{FitnessGoal, Sex, UserProfile};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calories per gram of protein and carbohydrate
const KCAL_PER_G_PROTEIN_CARB: f64 = 4.0;
/// Calories per gram of fat
const KCAL_PER_G_FAT: f64 = 9.0;

/// Per-kilogram macro ratios and calorie adjustment for a fitness goal
#[derive(Debug, Clone, Copy)]
pub struct MacroRatios {
    /// Grams of protein per kilogram of body weight
    pub protein_per_kg: f64,
    /// Grams of fat per kilogram of body weight
    pub fat_per_kg: f64,
    /// Calorie delta applied to TDEE
    pub calorie_delta: f64,
}

impl MacroRatios {
    /// Fixed ratio table keyed by goal
    #[must_use]
    pub const fn for_goal(goal: FitnessGoal) -> Self {
        match goal {
            FitnessGoal::LoseWeight => Self {
                protein_per_kg: 2.2,
                fat_per_kg: 0.9,
                calorie_delta: -500.0,
            },
            FitnessGoal::Maintain => Self {
                protein_per_kg: 1.8,
                fat_per_kg: 1.0,
                calorie_delta: 0.0,
            },
            FitnessGoal::GainMuscle => Self {
                protein_per_kg: 2.0,
                fat_per_kg: 1.0,
                calorie_delta: 300.0,
            },
        }
    }
}

/// Computed daily nutrition targets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MacroTargets {
    pub calories: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
}

/// Basal metabolic rate via Mifflin–St Jeor
#[must_use]
pub fn bmr(sex: Sex, weight_kg: f64, height_cm: f64, age: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let age = age as f64;
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age;
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Total daily energy expenditure: BMR scaled by activity level
#[must_use]
pub fn tdee(profile: &UserProfile) -> f64 {
    bmr(profile.sex, profile.weight_kg, profile.height_cm, profile.age)
        * profile.activity_level.multiplier()
}

/// Daily macro targets for a profile
///
/// Three passes: calories (TDEE plus goal delta, floored), then protein and
/// fat from the per-kilogram table, then carbs filling the remaining calorie
/// budget.
#[must_use]
pub fn macro_targets(profile: &UserProfile) -> MacroTargets {
    let ratios = MacroRatios::for_goal(profile.goal);

    let calories = (tdee(profile) + ratios.calorie_delta).max(limits::MIN_DAILY_CALORIES);
    let protein_g = profile.weight_kg * ratios.protein_per_kg;
    let fat_g = profile.weight_kg * ratios.fat_per_kg;

    let remaining =
        calories - protein_g * KCAL_PER_G_PROTEIN_CARB - fat_g * KCAL_PER_G_FAT;
    let carbs_g = (remaining / KCAL_PER_G_PROTEIN_CARB).max(0.0);

    MacroTargets {
        calories: calories.round(),
        protein_g: protein_g.round(),
        fat_g: fat_g.round(),
        carbs_g: carbs_g.round(),
    }
}

/// Macros for a quantity of food given its per-100g values
#[must_use]
pub fn scale_per_100g(per_100g: f64, quantity_g: f64) -> f64 {
    per_100g * quantity_g / 100.0
}

/// Consecutive-day workout streak ending today or yesterday
///
/// `completed_days` must be distinct calendar days sorted descending. A
/// streak broken earlier today still counts while yesterday's entry exists.
#[must_use]
pub fn current_streak(completed_days: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut expected = today;
    let mut streak = 0;

    for &day in completed_days {
        if day == expected {
            streak += 1;
            expected -= Duration::days(1);
        } else if streak == 0 && day == today - Duration::days(1) {
            // No workout yet today; streak continues from yesterday
            streak = 1;
            expected = day - Duration::days(1);
        } else {
            break;
        }
    }

    streak
}

/// Percentage change between two period totals
///
/// A previous total of zero maps to 100% when anything happened this period,
/// 0% otherwise, so dashboards never divide by zero.
#[must_use]
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        ((current - previous) / previous * 100.0 * 10.0).round() / 10.0
    }
}
