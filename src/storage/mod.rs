//! Storage
//!
//! One async persistence contract with three interchangeable backends:
//!
//! - [`MemStorage`]: process-local maps behind a lock
//! - [`DocumentStorage`]: schemaless JSON documents in named collections,
//!   addressed by 24-hex document keys and mapped to entities at the boundary
//! - [`MappedStorage`]: one typed table per entity, rows mapped to structs
//!
//! The two persistent backends share an embedded SQLite database. All three
//! return identical results for identical inputs; workout statistics are
//! computed by a shared default method so they cannot diverge.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::db::{DatabaseLocation, DbError};
use crate::metrics::{compute_workout_stats, WorkoutStats};
use crate::models::{
    ChallengeCreate, DailyChallenge, Exercise, ExerciseCreate, Meal, MealCreate,
    MotivationalQuote, NutritionGoal, NutritionGoalUpdate, QuoteCategory, Recipe, RecipeCreate,
    RecordId, UserProfile, UserProfileUpdate, WeightEntry, WeightEntryCreate, Workout,
    WorkoutCreate, WorkoutUpdate, WorkoutWithExercises,
};

mod document;
mod mapped;
mod memory;
pub mod seed;
mod slot;

pub use document::DocumentStorage;
pub use mapped::MappedStorage;
pub use memory::MemStorage;

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Storage is not connected")]
    NotConnected,

    #[error("{entity} {id} does not exist")]
    InvalidReference { entity: &'static str, id: RecordId },

    #[error("Corrupt {collection} document {key}: {reason}")]
    CorruptDocument {
        collection: &'static str,
        key: String,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Database(DbError::Sqlite(e))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence contract shared by every backend.
///
/// Lookups that find nothing return `Ok(None)`; ids a backend can't parse
/// are treated the same way.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Short backend name for logs and `/health`
    fn backend_name(&self) -> &'static str;

    /// Open the backend. Idempotent; seeds empty collections on first open.
    async fn connect(&self) -> StorageResult<()>;

    /// Close the backend. A no-op when not connected.
    async fn disconnect(&self) -> StorageResult<()>;

    async fn is_connected(&self) -> bool;

    // ------------------------------------------------------------------
    // Exercises
    // ------------------------------------------------------------------

    async fn get_all_exercises(&self) -> StorageResult<Vec<Exercise>>;
    async fn get_exercise_by_id(&self, id: &RecordId) -> StorageResult<Option<Exercise>>;
    async fn create_exercise(&self, data: ExerciseCreate) -> StorageResult<Exercise>;

    // ------------------------------------------------------------------
    // Workouts
    // ------------------------------------------------------------------

    /// Workouts without detail, newest first
    async fn get_all_workouts(&self) -> StorageResult<Vec<Workout>>;

    async fn get_recent_workouts(&self, limit: usize) -> StorageResult<Vec<Workout>> {
        let mut workouts = self.get_all_workouts().await?;
        workouts.truncate(limit);
        Ok(workouts)
    }

    async fn get_workout_by_id(&self, id: &RecordId)
        -> StorageResult<Option<WorkoutWithExercises>>;

    /// Create a workout with its entries and sets. Every referenced exercise
    /// is checked before anything is written.
    async fn create_workout(&self, data: WorkoutCreate) -> StorageResult<WorkoutWithExercises>;

    async fn update_workout(
        &self,
        id: &RecordId,
        data: WorkoutUpdate,
    ) -> StorageResult<Option<Workout>>;

    /// Delete a workout with its entries and sets. `false` if it didn't exist.
    async fn delete_workout(&self, id: &RecordId) -> StorageResult<bool>;

    /// Every workout with its detail, newest first
    async fn get_all_workout_details(&self) -> StorageResult<Vec<WorkoutWithExercises>> {
        let mut details = Vec::new();
        for workout in self.get_all_workouts().await? {
            if let Some(detail) = self.get_workout_by_id(&workout.id).await? {
                details.push(detail);
            }
        }
        Ok(details)
    }

    /// Weekly count, total volume and average duration, computed fresh
    async fn get_workout_stats(&self) -> StorageResult<WorkoutStats> {
        let details = self.get_all_workout_details().await?;
        Ok(compute_workout_stats(&details, Utc::now()))
    }

    // ------------------------------------------------------------------
    // Meals and recipes
    // ------------------------------------------------------------------

    async fn create_meal(&self, data: MealCreate) -> StorageResult<Meal>;

    /// Meals on one UTC calendar day, oldest first
    async fn get_meals_by_date(&self, date: NaiveDate) -> StorageResult<Vec<Meal>>;

    /// All meals, newest first
    async fn get_all_meals(&self) -> StorageResult<Vec<Meal>>;

    async fn get_all_recipes(&self) -> StorageResult<Vec<Recipe>>;
    async fn create_recipe(&self, data: RecipeCreate) -> StorageResult<Recipe>;

    // ------------------------------------------------------------------
    // Nutrition goal, weight and profile
    // ------------------------------------------------------------------

    async fn get_nutrition_goals(&self) -> StorageResult<Option<NutritionGoal>>;

    /// Replace the single goal record, creating it if needed
    async fn update_nutrition_goals(&self, data: NutritionGoalUpdate)
        -> StorageResult<NutritionGoal>;

    async fn create_weight_entry(&self, data: WeightEntryCreate) -> StorageResult<WeightEntry>;

    /// Newest first
    async fn get_weight_entries(&self) -> StorageResult<Vec<WeightEntry>>;

    async fn get_latest_weight(&self) -> StorageResult<Option<WeightEntry>>;

    async fn get_user_profile(&self) -> StorageResult<Option<UserProfile>>;

    /// Replace the single profile record, creating it if needed
    async fn update_user_profile(&self, data: UserProfileUpdate) -> StorageResult<UserProfile>;

    // ------------------------------------------------------------------
    // Motivation
    // ------------------------------------------------------------------

    async fn get_random_quote(&self) -> StorageResult<Option<MotivationalQuote>>;

    async fn get_quotes_by_category(
        &self,
        category: QuoteCategory,
    ) -> StorageResult<Vec<MotivationalQuote>>;

    /// First challenge dated on the given UTC day
    async fn get_challenge_for_date(&self, date: NaiveDate)
        -> StorageResult<Option<DailyChallenge>>;

    async fn get_todays_challenge(&self) -> StorageResult<Option<DailyChallenge>> {
        self.get_challenge_for_date(Utc::now().date_naive()).await
    }

    async fn get_all_challenges(&self) -> StorageResult<Vec<DailyChallenge>>;
    async fn create_challenge(&self, data: ChallengeCreate) -> StorageResult<DailyChallenge>;
}

/// Sort rows given in insertion order by date, newest first. Rows sharing a
/// date keep the later insert first.
pub(crate) fn newest_first<T>(mut rows: Vec<T>, date: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.reverse();
    rows.sort_by(|a, b| date(b).cmp(&date(a)));
    rows
}

// ============================================================================
// Factory
// ============================================================================

/// Which backend to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Memory,
    Document,
    Mapped,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Document => "document",
            StorageBackend::Mapped => "mapped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Some(StorageBackend::Memory),
            "document" | "documents" | "doc" => Some(StorageBackend::Document),
            "mapped" | "table" | "tables" => Some(StorageBackend::Mapped),
            _ => None,
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the configured backend. The store is not connected yet.
pub fn create_storage(backend: StorageBackend, location: DatabaseLocation) -> Arc<dyn Storage> {
    match backend {
        StorageBackend::Memory => Arc::new(MemStorage::new()),
        StorageBackend::Document => Arc::new(DocumentStorage::new(location)),
        StorageBackend::Mapped => Arc::new(MappedStorage::new(location)),
    }
}

#[cfg(test)]
mod contract_tests;
