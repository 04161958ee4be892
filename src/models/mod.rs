//! Data models
//!
//! Rust structs for the tracked entities, their create/update payloads, and
//! the row mappings used by the table-backed store.

mod body;
mod exercise;
mod goal;
mod meal;
mod motivation;
mod recipe;
mod record_id;
mod serde_helpers;
mod sql;
mod validation;
mod workout;

pub use body::{
    Gender, HeightUnit, UserProfile, UserProfileUpdate, WeightEntry, WeightEntryCreate,
    WeightUnit,
};
pub use exercise::{Difficulty, Exercise, ExerciseCreate};
pub use goal::{ActivityLevel, NutritionGoal, NutritionGoalUpdate, WeightGoal};
pub use meal::{Meal, MealCreate, MealType};
pub use motivation::{
    ChallengeCreate, ChallengeDifficulty, ChallengeType, DailyChallenge, MotivationalQuote,
    QuoteCategory, QuoteCreate,
};
pub use recipe::{Recipe, RecipeCreate};
pub use record_id::RecordId;
pub use validation::{FieldError, Validate};
pub use workout::{
    SetCreate, Workout, WorkoutCreate, WorkoutExercise, WorkoutExerciseCreate,
    WorkoutExerciseDetail, WorkoutSet, WorkoutUpdate, WorkoutWithExercises,
};
