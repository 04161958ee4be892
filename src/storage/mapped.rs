//! Table-mapped storage
//!
//! One typed table per entity. Each row maps to its struct through the
//! model's `from_row`; ids are the SQLite row ids rendered as strings.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::info;

use super::slot::ConnectionSlot;
use super::{seed, Storage, StorageError, StorageResult};
use crate::db::{Database, DatabaseLocation, DbResult};
use crate::models::{
    ChallengeCreate, DailyChallenge, Exercise, ExerciseCreate, Meal, MealCreate,
    MotivationalQuote, NutritionGoal, NutritionGoalUpdate, QuoteCategory, Recipe, RecipeCreate,
    RecordId, UserProfile, UserProfileUpdate, WeightEntry, WeightEntryCreate, Workout,
    WorkoutCreate, WorkoutExercise, WorkoutSet, WorkoutUpdate, WorkoutWithExercises,
};

/// `[start, end)` of a UTC calendar day
pub(crate) fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

pub struct MappedStorage {
    slot: ConnectionSlot,
}

impl MappedStorage {
    pub fn new(location: DatabaseLocation) -> Self {
        Self {
            slot: ConnectionSlot::new(location),
        }
    }
}

/// Fill empty tables with the default content
fn seed_tables(db: &Database) -> StorageResult<()> {
    db.with_conn(|conn| {
        let now = Utc::now();

        if Exercise::count(conn)? == 0 {
            for data in seed::exercises() {
                Exercise::insert(conn, &data)?;
            }
            info!("Seeded exercises");
        }
        if Recipe::count(conn)? == 0 {
            for data in seed::recipes() {
                Recipe::insert(conn, &data, now)?;
            }
            info!("Seeded recipes");
        }
        if MotivationalQuote::count(conn)? == 0 {
            for data in seed::quotes() {
                MotivationalQuote::insert(conn, &data)?;
            }
            info!("Seeded motivational quotes");
        }
        if DailyChallenge::count(conn)? == 0 {
            for data in seed::challenges(now) {
                DailyChallenge::insert(conn, &data, now)?;
            }
            info!("Seeded daily challenges");
        }
        Ok(())
    })?;
    Ok(())
}

/// Insert the workout tree inside one transaction. `Ok(Err(id))` names the
/// first exercise that doesn't exist; nothing is written in that case.
fn insert_workout_tree(
    conn: &mut rusqlite::Connection,
    data: &WorkoutCreate,
) -> DbResult<Result<WorkoutWithExercises, RecordId>> {
    let tx = conn.transaction()?;

    let mut exercise_ids = Vec::with_capacity(data.exercises.len());
    for entry in &data.exercises {
        let existing = match entry.exercise_id.as_i64() {
            Some(id) => Exercise::get_by_id(&tx, id)?.map(|_| id),
            None => None,
        };
        match existing {
            Some(id) => exercise_ids.push(id),
            None => return Ok(Err(entry.exercise_id.clone())),
        }
    }

    let workout_id = Workout::insert(&tx, data, Utc::now())?;
    for (order_index, (entry, exercise_id)) in data.exercises.iter().zip(exercise_ids).enumerate() {
        let entry_id = WorkoutExercise::insert(&tx, workout_id, exercise_id, order_index as i64)?;
        for (i, set) in entry.sets.iter().enumerate() {
            WorkoutSet::insert(&tx, entry_id, i as i64 + 1, set)?;
        }
    }
    tx.commit()?;

    let detail = WorkoutWithExercises::load(conn, workout_id)?
        .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
    Ok(Ok(detail))
}

#[async_trait]
impl Storage for MappedStorage {
    fn backend_name(&self) -> &'static str {
        "mapped"
    }

    async fn connect(&self) -> StorageResult<()> {
        if self.slot.connect(seed_tables).await? {
            info!("Table storage ready at {}", self.slot.location());
        }
        Ok(())
    }

    async fn disconnect(&self) -> StorageResult<()> {
        if self.slot.disconnect().await {
            info!("Table storage disconnected");
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.slot.is_connected().await
    }

    // ------------------------------------------------------------------
    // Exercises
    // ------------------------------------------------------------------

    async fn get_all_exercises(&self) -> StorageResult<Vec<Exercise>> {
        self.slot.with_conn(Exercise::list).await
    }

    async fn get_exercise_by_id(&self, id: &RecordId) -> StorageResult<Option<Exercise>> {
        let Some(id) = id.as_i64() else {
            return Ok(None);
        };
        self.slot.with_conn(move |conn| Exercise::get_by_id(conn, id)).await
    }

    async fn create_exercise(&self, data: ExerciseCreate) -> StorageResult<Exercise> {
        self.slot.with_conn(move |conn| Exercise::insert(conn, &data)).await
    }

    // ------------------------------------------------------------------
    // Workouts
    // ------------------------------------------------------------------

    async fn get_all_workouts(&self) -> StorageResult<Vec<Workout>> {
        self.slot.with_conn(|conn| Workout::list(conn, None)).await
    }

    async fn get_recent_workouts(&self, limit: usize) -> StorageResult<Vec<Workout>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.slot
            .with_conn(move |conn| Workout::list(conn, Some(limit)))
            .await
    }

    async fn get_workout_by_id(
        &self,
        id: &RecordId,
    ) -> StorageResult<Option<WorkoutWithExercises>> {
        let Some(id) = id.as_i64() else {
            return Ok(None);
        };
        self.slot
            .with_conn(move |conn| WorkoutWithExercises::load(conn, id))
            .await
    }

    async fn create_workout(&self, data: WorkoutCreate) -> StorageResult<WorkoutWithExercises> {
        let created = self
            .slot
            .run(move |db| Ok(db.with_conn_mut(|conn| insert_workout_tree(conn, &data))?))
            .await?;

        created.map_err(|id| StorageError::InvalidReference {
            entity: "exercise",
            id,
        })
    }

    async fn update_workout(
        &self,
        id: &RecordId,
        data: WorkoutUpdate,
    ) -> StorageResult<Option<Workout>> {
        let Some(id) = id.as_i64() else {
            return Ok(None);
        };
        self.slot
            .with_conn(move |conn| Workout::update(conn, id, &data))
            .await
    }

    async fn delete_workout(&self, id: &RecordId) -> StorageResult<bool> {
        let Some(id) = id.as_i64() else {
            return Ok(false);
        };
        self.slot.with_conn(move |conn| Workout::delete(conn, id)).await
    }

    async fn get_all_workout_details(&self) -> StorageResult<Vec<WorkoutWithExercises>> {
        self.slot
            .with_conn(|conn| {
                let mut details = Vec::new();
                for workout in Workout::list(conn, None)? {
                    let Some(id) = workout.id.as_i64() else {
                        continue;
                    };
                    if let Some(detail) = WorkoutWithExercises::load(conn, id)? {
                        details.push(detail);
                    }
                }
                Ok(details)
            })
            .await
    }

    // ------------------------------------------------------------------
    // Meals and recipes
    // ------------------------------------------------------------------

    async fn create_meal(&self, data: MealCreate) -> StorageResult<Meal> {
        self.slot
            .with_conn(move |conn| Meal::insert(conn, &data, Utc::now()))
            .await
    }

    async fn get_meals_by_date(&self, date: NaiveDate) -> StorageResult<Vec<Meal>> {
        let (start, end) = day_bounds(date);
        self.slot
            .with_conn(move |conn| Meal::list_between(conn, start, end))
            .await
    }

    async fn get_all_meals(&self) -> StorageResult<Vec<Meal>> {
        self.slot.with_conn(Meal::list).await
    }

    async fn get_all_recipes(&self) -> StorageResult<Vec<Recipe>> {
        self.slot.with_conn(Recipe::list).await
    }

    async fn create_recipe(&self, data: RecipeCreate) -> StorageResult<Recipe> {
        self.slot
            .with_conn(move |conn| Recipe::insert(conn, &data, Utc::now()))
            .await
    }

    // ------------------------------------------------------------------
    // Nutrition goal, weight and profile
    // ------------------------------------------------------------------

    async fn get_nutrition_goals(&self) -> StorageResult<Option<NutritionGoal>> {
        self.slot.with_conn(NutritionGoal::get).await
    }

    async fn update_nutrition_goals(
        &self,
        data: NutritionGoalUpdate,
    ) -> StorageResult<NutritionGoal> {
        self.slot
            .with_conn(move |conn| NutritionGoal::set(conn, &data, Utc::now()))
            .await
    }

    async fn create_weight_entry(&self, data: WeightEntryCreate) -> StorageResult<WeightEntry> {
        self.slot
            .with_conn(move |conn| WeightEntry::insert(conn, &data, Utc::now()))
            .await
    }

    async fn get_weight_entries(&self) -> StorageResult<Vec<WeightEntry>> {
        self.slot.with_conn(WeightEntry::list).await
    }

    async fn get_latest_weight(&self) -> StorageResult<Option<WeightEntry>> {
        self.slot.with_conn(WeightEntry::latest).await
    }

    async fn get_user_profile(&self) -> StorageResult<Option<UserProfile>> {
        self.slot.with_conn(UserProfile::get).await
    }

    async fn update_user_profile(&self, data: UserProfileUpdate) -> StorageResult<UserProfile> {
        self.slot
            .with_conn(move |conn| UserProfile::set(conn, &data, Utc::now()))
            .await
    }

    // ------------------------------------------------------------------
    // Motivation
    // ------------------------------------------------------------------

    async fn get_random_quote(&self) -> StorageResult<Option<MotivationalQuote>> {
        self.slot.with_conn(MotivationalQuote::random).await
    }

    async fn get_quotes_by_category(
        &self,
        category: QuoteCategory,
    ) -> StorageResult<Vec<MotivationalQuote>> {
        self.slot
            .with_conn(move |conn| MotivationalQuote::list_by_category(conn, category))
            .await
    }

    async fn get_challenge_for_date(
        &self,
        date: NaiveDate,
    ) -> StorageResult<Option<DailyChallenge>> {
        let (start, end) = day_bounds(date);
        self.slot
            .with_conn(move |conn| DailyChallenge::first_between(conn, start, end))
            .await
    }

    async fn get_all_challenges(&self) -> StorageResult<Vec<DailyChallenge>> {
        self.slot.with_conn(DailyChallenge::list).await
    }

    async fn create_challenge(&self, data: ChallengeCreate) -> StorageResult<DailyChallenge> {
        self.slot
            .with_conn(move |conn| DailyChallenge::insert(conn, &data, Utc::now()))
            .await
    }
}
