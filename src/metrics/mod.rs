//! Metrics
//!
//! Pure calculations over stored entities. Nothing here touches storage.

pub mod body;
pub mod nutrition;
pub mod units;
pub mod workout;

pub use body::{
    activity_factor, bmi_for, calculate_bmi, calculate_maintenance_calories,
    recommended_calories, round_one_decimal, BmiCategory, MacroTargets,
};
pub use nutrition::{daily_totals, DailyTotals};
pub use workout::{
    achievements, compute_workout_stats, set_volume, workout_streaks, workout_volume,
    Achievement, WorkoutStats, WorkoutStreaks,
};
