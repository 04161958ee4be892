//! In-memory storage
//!
//! Maps keyed by sequential row numbers behind one `RwLock`. Nothing
//! survives the process. Seeded at construction for local development; see
//! [`seed::MEMORY_EXERCISE_COUNT`].

use std::collections::{btree_map, BTreeMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use tracing::debug;

use super::{newest_first, seed, Storage, StorageError, StorageResult};
use crate::models::{
    ChallengeCreate, DailyChallenge, Exercise, ExerciseCreate, Meal, MealCreate,
    MotivationalQuote, NutritionGoal, NutritionGoalUpdate, QuoteCategory, Recipe, RecipeCreate,
    RecordId, UserProfile, UserProfileUpdate, WeightEntry, WeightEntryCreate, Workout,
    WorkoutCreate, WorkoutExercise, WorkoutExerciseDetail, WorkoutSet, WorkoutUpdate,
    WorkoutWithExercises,
};

/// Rows of one entity kind with their id sequence
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    fn allocate(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert_with(&mut self, build: impl FnOnce(RecordId) -> T) -> T {
        let id = self.allocate();
        let row = build(RecordId::from(id));
        self.rows.insert(id, row.clone());
        row
    }

    fn get(&self, id: &RecordId) -> Option<&T> {
        id.as_i64().and_then(|id| self.rows.get(&id))
    }

    /// Rows in insertion order
    fn values(&self) -> btree_map::Values<'_, i64, T> {
        self.rows.values()
    }
}

#[derive(Debug, Default)]
struct MemState {
    exercises: Table<Exercise>,
    workouts: Table<Workout>,
    workout_exercises: Table<WorkoutExercise>,
    sets: Table<WorkoutSet>,
    meals: Table<Meal>,
    recipes: Table<Recipe>,
    weight_entries: Table<WeightEntry>,
    quotes: Table<MotivationalQuote>,
    challenges: Table<DailyChallenge>,
    nutrition_goal: Option<NutritionGoal>,
    user_profile: Option<UserProfile>,
}

impl MemState {
    fn seeded() -> Self {
        let mut state = Self::default();
        let now = Utc::now();

        for data in seed::exercises().into_iter().take(seed::MEMORY_EXERCISE_COUNT) {
            state.exercises.insert_with(|id| data.into_exercise(id));
        }
        for data in seed::recipes() {
            state.recipes.insert_with(|id| data.into_recipe(id, now));
        }
        for data in seed::quotes() {
            state.quotes.insert_with(|id| data.into_quote(id));
        }
        for data in seed::challenges(now) {
            state.challenges.insert_with(|id| data.into_challenge(id, now));
        }
        state
    }

    fn detail(&self, workout: &Workout) -> WorkoutWithExercises {
        let mut entries: Vec<&WorkoutExercise> = self
            .workout_exercises
            .values()
            .filter(|e| e.workout_id == workout.id)
            .collect();
        entries.sort_by_key(|e| e.order_index);

        let exercises = entries
            .into_iter()
            .map(|entry| {
                let mut sets: Vec<WorkoutSet> = self
                    .sets
                    .values()
                    .filter(|s| s.workout_exercise_id == entry.id)
                    .cloned()
                    .collect();
                sets.sort_by_key(|s| s.set_number);
                WorkoutExerciseDetail {
                    entry: entry.clone(),
                    exercise: self.exercises.get(&entry.exercise_id).cloned(),
                    sets,
                }
            })
            .collect();

        WorkoutWithExercises {
            workout: workout.clone(),
            exercises,
        }
    }
}

/// Process-local store
pub struct MemStorage {
    state: RwLock<MemState>,
    connected: AtomicBool,
}

impl MemStorage {
    /// A store preloaded with the default content
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemState::seeded()),
            connected: AtomicBool::new(false),
        }
    }

    /// A store with no content at all
    pub fn empty() -> Self {
        Self {
            state: RwLock::new(MemState::default()),
            connected: AtomicBool::new(false),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn connect(&self) -> StorageResult<()> {
        if !self.connected.swap(true, Ordering::SeqCst) {
            debug!("Memory storage ready");
        }
        Ok(())
    }

    async fn disconnect(&self) -> StorageResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // Exercises
    // ------------------------------------------------------------------

    async fn get_all_exercises(&self) -> StorageResult<Vec<Exercise>> {
        Ok(self.state.read().await.exercises.values().cloned().collect())
    }

    async fn get_exercise_by_id(&self, id: &RecordId) -> StorageResult<Option<Exercise>> {
        Ok(self.state.read().await.exercises.get(id).cloned())
    }

    async fn create_exercise(&self, data: ExerciseCreate) -> StorageResult<Exercise> {
        let mut state = self.state.write().await;
        Ok(state.exercises.insert_with(|id| data.into_exercise(id)))
    }

    // ------------------------------------------------------------------
    // Workouts
    // ------------------------------------------------------------------

    async fn get_all_workouts(&self) -> StorageResult<Vec<Workout>> {
        let state = self.state.read().await;
        let workouts = state.workouts.values().cloned().collect();
        Ok(newest_first(workouts, |w| w.date))
    }

    async fn get_workout_by_id(
        &self,
        id: &RecordId,
    ) -> StorageResult<Option<WorkoutWithExercises>> {
        let state = self.state.read().await;
        Ok(state.workouts.get(id).map(|w| state.detail(w)))
    }

    async fn create_workout(&self, data: WorkoutCreate) -> StorageResult<WorkoutWithExercises> {
        // One write guard for the whole tree, so readers never see half of it
        let mut state = self.state.write().await;

        let mut exercise_ids = Vec::with_capacity(data.exercises.len());
        for entry in &data.exercises {
            match state.exercises.get(&entry.exercise_id) {
                Some(exercise) => exercise_ids.push(exercise.id.clone()),
                None => {
                    return Err(StorageError::InvalidReference {
                        entity: "exercise",
                        id: entry.exercise_id.clone(),
                    })
                }
            }
        }

        let now = Utc::now();
        let workout = state.workouts.insert_with(|id| data.to_workout(id, now));

        for (order_index, (entry_data, exercise_id)) in
            data.exercises.iter().zip(exercise_ids).enumerate()
        {
            let entry = state.workout_exercises.insert_with(|id| WorkoutExercise {
                id,
                workout_id: workout.id.clone(),
                exercise_id,
                order_index: order_index as i64,
            });
            for (i, set_data) in entry_data.sets.iter().enumerate() {
                state
                    .sets
                    .insert_with(|id| set_data.to_set(id, entry.id.clone(), i as i64 + 1));
            }
        }

        Ok(state.detail(&workout))
    }

    async fn update_workout(
        &self,
        id: &RecordId,
        data: WorkoutUpdate,
    ) -> StorageResult<Option<Workout>> {
        let mut state = self.state.write().await;
        let Some(key) = id.as_i64() else {
            return Ok(None);
        };
        Ok(state.workouts.rows.get_mut(&key).map(|workout| {
            data.apply(workout);
            workout.clone()
        }))
    }

    async fn delete_workout(&self, id: &RecordId) -> StorageResult<bool> {
        let mut state = self.state.write().await;
        let Some(key) = id.as_i64() else {
            return Ok(false);
        };
        if state.workouts.rows.remove(&key).is_none() {
            return Ok(false);
        }
        let id = &RecordId::from(key);

        let entry_ids: Vec<RecordId> = state
            .workout_exercises
            .values()
            .filter(|e| &e.workout_id == id)
            .map(|e| e.id.clone())
            .collect();
        state
            .sets
            .rows
            .retain(|_, s| !entry_ids.contains(&s.workout_exercise_id));
        state.workout_exercises.rows.retain(|_, e| &e.workout_id != id);

        Ok(true)
    }

    // ------------------------------------------------------------------
    // Meals and recipes
    // ------------------------------------------------------------------

    async fn create_meal(&self, data: MealCreate) -> StorageResult<Meal> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        Ok(state.meals.insert_with(|id| data.into_meal(id, now)))
    }

    async fn get_meals_by_date(&self, date: NaiveDate) -> StorageResult<Vec<Meal>> {
        let state = self.state.read().await;
        let mut meals: Vec<Meal> = state
            .meals
            .values()
            .filter(|m| m.is_on(date))
            .cloned()
            .collect();
        meals.sort_by_key(|m| m.date);
        Ok(meals)
    }

    async fn get_all_meals(&self) -> StorageResult<Vec<Meal>> {
        let state = self.state.read().await;
        let meals = state.meals.values().cloned().collect();
        Ok(newest_first(meals, |m| m.date))
    }

    async fn get_all_recipes(&self) -> StorageResult<Vec<Recipe>> {
        Ok(self.state.read().await.recipes.values().cloned().collect())
    }

    async fn create_recipe(&self, data: RecipeCreate) -> StorageResult<Recipe> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        Ok(state.recipes.insert_with(|id| data.into_recipe(id, now)))
    }

    // ------------------------------------------------------------------
    // Nutrition goal, weight and profile
    // ------------------------------------------------------------------

    async fn get_nutrition_goals(&self) -> StorageResult<Option<NutritionGoal>> {
        Ok(self.state.read().await.nutrition_goal.clone())
    }

    async fn update_nutrition_goals(
        &self,
        data: NutritionGoalUpdate,
    ) -> StorageResult<NutritionGoal> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let created_at = state.nutrition_goal.as_ref().map_or(now, |g| g.created_at);
        let goal = data.into_goal(RecordId::from(1), created_at, now);
        state.nutrition_goal = Some(goal.clone());
        Ok(goal)
    }

    async fn create_weight_entry(&self, data: WeightEntryCreate) -> StorageResult<WeightEntry> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        Ok(state.weight_entries.insert_with(|id| data.into_entry(id, now)))
    }

    async fn get_weight_entries(&self) -> StorageResult<Vec<WeightEntry>> {
        let state = self.state.read().await;
        let entries = state.weight_entries.values().cloned().collect();
        Ok(newest_first(entries, |w| w.date))
    }

    async fn get_latest_weight(&self) -> StorageResult<Option<WeightEntry>> {
        Ok(self.get_weight_entries().await?.into_iter().next())
    }

    async fn get_user_profile(&self) -> StorageResult<Option<UserProfile>> {
        Ok(self.state.read().await.user_profile.clone())
    }

    async fn update_user_profile(&self, data: UserProfileUpdate) -> StorageResult<UserProfile> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let created_at = state.user_profile.as_ref().map_or(now, |p| p.created_at);
        let profile = data.into_profile(RecordId::from(1), created_at, now);
        state.user_profile = Some(profile.clone());
        Ok(profile)
    }

    // ------------------------------------------------------------------
    // Motivation
    // ------------------------------------------------------------------

    async fn get_random_quote(&self) -> StorageResult<Option<MotivationalQuote>> {
        let state = self.state.read().await;
        let quotes: Vec<&MotivationalQuote> = state.quotes.values().collect();
        Ok(quotes.choose(&mut rand::thread_rng()).map(|q| (*q).clone()))
    }

    async fn get_quotes_by_category(
        &self,
        category: QuoteCategory,
    ) -> StorageResult<Vec<MotivationalQuote>> {
        let state = self.state.read().await;
        let quotes = state
            .quotes
            .values()
            .filter(|q| q.category == category)
            .cloned()
            .collect();
        Ok(quotes)
    }

    async fn get_challenge_for_date(
        &self,
        date: NaiveDate,
    ) -> StorageResult<Option<DailyChallenge>> {
        let state = self.state.read().await;
        let found = state.challenges.values().find(|c| c.is_on(date)).cloned();
        Ok(found)
    }

    async fn get_all_challenges(&self) -> StorageResult<Vec<DailyChallenge>> {
        Ok(self.state.read().await.challenges.values().cloned().collect())
    }

    async fn create_challenge(&self, data: ChallengeCreate) -> StorageResult<DailyChallenge> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        Ok(state.challenges.insert_with(|id| data.into_challenge(id, now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeds_three_exercises_at_construction() {
        let storage = MemStorage::new();
        let exercises = storage.get_all_exercises().await.unwrap();
        assert_eq!(exercises.len(), seed::MEMORY_EXERCISE_COUNT);
        assert_eq!(exercises[0].name, "Bench Press");
        assert!(storage.get_random_quote().await.unwrap().is_some());
        assert!(storage.get_todays_challenge().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_store_has_no_content() {
        let storage = MemStorage::empty();
        assert!(storage.get_all_exercises().await.unwrap().is_empty());
        assert!(storage.get_random_quote().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let storage = MemStorage::new();
        let id = RecordId::new("not-a-number");
        assert!(storage.get_exercise_by_id(&id).await.unwrap().is_none());
        assert!(storage.get_workout_by_id(&id).await.unwrap().is_none());
        assert!(!storage.delete_workout(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_workout_removes_entries_and_sets() {
        let storage = MemStorage::new();
        let payload: WorkoutCreate = serde_json::from_value(serde_json::json!({
            "name": "Upper",
            "date": "2024-05-01T10:00:00Z",
            "exercises": [
                {"exerciseId": 1, "sets": [{"weight": "60", "reps": 8}, {"weight": "60", "reps": 8}]},
                {"exerciseId": 2, "sets": [{"weight": "80", "reps": 5}]}
            ]
        }))
        .unwrap();
        let kept = storage.create_workout(payload.clone()).await.unwrap();
        let removed = storage.create_workout(payload).await.unwrap();

        assert!(storage.delete_workout(&removed.workout.id).await.unwrap());

        let state = storage.state.read().await;
        assert_eq!(state.workout_exercises.rows.len(), 2);
        assert_eq!(state.sets.rows.len(), 3);
        assert!(state.workout_exercises.values().all(|e| e.workout_id == kept.workout.id));
        drop(state);

        assert!(storage.delete_workout(&kept.workout.id).await.unwrap());
        let state = storage.state.read().await;
        assert!(state.workout_exercises.rows.is_empty());
        assert!(state.sets.rows.is_empty());
    }

    #[tokio::test]
    async fn test_connect_flag() {
        let storage = MemStorage::new();
        assert!(!storage.is_connected().await);
        storage.connect().await.unwrap();
        storage.connect().await.unwrap();
        assert!(storage.is_connected().await);
        storage.disconnect().await.unwrap();
        storage.disconnect().await.unwrap();
        assert!(!storage.is_connected().await);
    }
}
