//! Body metrics
//!
//! BMI and Mifflin-St Jeor maintenance calories, plus the goal-adjusted
//! calorie recommendation and its macro split.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::units::{height_to_cm, height_to_m, weight_to_kg};
use crate::models::{ActivityLevel, Gender, HeightUnit, UserProfile, WeightEntry, WeightGoal, WeightUnit};

/// Calorie shift applied for lose/gain goals
pub const GOAL_ADJUSTMENT_KCAL: i64 = 500;

/// Body mass index from weight and height in any supported units.
/// Not rounded; callers round for display.
pub fn calculate_bmi(
    weight: f64,
    height: f64,
    weight_unit: WeightUnit,
    height_unit: HeightUnit,
) -> f64 {
    let kg = weight_to_kg(weight, weight_unit);
    let m = height_to_m(height, height_unit);
    kg / (m * m)
}

/// BMI for a stored profile and weight entry; `None` without a usable height
pub fn bmi_for(profile: &UserProfile, weight: &WeightEntry) -> Option<f64> {
    let height = profile.height?.to_f64()?;
    if height <= 0.0 {
        return None;
    }
    let weight_value = weight.weight.to_f64()?;
    Some(calculate_bmi(weight_value, height, weight.unit, profile.height_unit))
}

/// Standard adult BMI bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// TDEE multiplier for an activity level
pub fn activity_factor(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
        ActivityLevel::VeryActive => 1.9,
    }
}

/// Mifflin-St Jeor basal metabolic rate
pub fn basal_metabolic_rate(weight_kg: f64, height_cm: f64, age: i64, gender: Gender) -> f64 {
    let offset = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64 + offset
}

/// Daily maintenance calories, rounded to the nearest kcal.
///
/// Returns `None` when the profile has no age or no height.
pub fn calculate_maintenance_calories(
    profile: &UserProfile,
    weight: &WeightEntry,
    activity: ActivityLevel,
) -> Option<i64> {
    let age = profile.age?;
    let height = profile.height?.to_f64()?;
    let weight_kg = weight_to_kg(weight.weight.to_f64()?, weight.unit);
    let height_cm = height_to_cm(height, profile.height_unit);

    let bmr = basal_metabolic_rate(weight_kg, height_cm, age, profile.gender);
    Some((bmr * activity_factor(activity)).round() as i64)
}

/// Maintenance shifted by the weight goal
pub fn recommended_calories(maintenance: i64, goal: WeightGoal) -> i64 {
    match goal {
        WeightGoal::Lose => maintenance.saturating_sub(GOAL_ADJUSTMENT_KCAL),
        WeightGoal::Maintain => maintenance,
        WeightGoal::Gain => maintenance.saturating_add(GOAL_ADJUSTMENT_KCAL),
    }
}

/// Gram targets for a calorie budget: 25% protein, 45% carbs, 30% fat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroTargets {
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

impl MacroTargets {
    pub fn from_calories(calories: i64) -> Self {
        let kcal = calories as f64;
        Self {
            protein: (kcal * 0.25 / 4.0).round() as i64,
            carbs: (kcal * 0.45 / 4.0).round() as i64,
            fat: (kcal * 0.30 / 9.0).round() as i64,
        }
    }
}
