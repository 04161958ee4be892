//! Document storage
//!
//! Schemaless JSON documents in named collections, addressed by 24-hex
//! document keys and mapped to entities at the boundary. Entity ids are the
//! document keys. Seeded documents also carry a sequential numeric `id`
//! field; lookups by an id that isn't a valid key fall back to that field.
//!
//! Writes are not transactional. A workout is written document by document,
//! and the documents already written are removed again if a later insert
//! fails.

mod collection;
mod keys;
mod mapping;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use self::collection::{Collection, Document};
use self::keys::{parse_key, KeyGenerator};
use self::mapping::{from_document, to_body};
use super::slot::ConnectionSlot;
use super::{newest_first, seed, Storage, StorageError, StorageResult};
use crate::db::{Database, DatabaseLocation};
use crate::models::{
    ChallengeCreate, DailyChallenge, Exercise, ExerciseCreate, Meal, MealCreate,
    MotivationalQuote, NutritionGoal, NutritionGoalUpdate, QuoteCategory, Recipe, RecipeCreate,
    RecordId, UserProfile, UserProfileUpdate, WeightEntry, WeightEntryCreate, Workout,
    WorkoutCreate, WorkoutExercise, WorkoutExerciseDetail, WorkoutSet, WorkoutUpdate,
    WorkoutWithExercises,
};

pub struct DocumentStorage {
    slot: ConnectionSlot,
    keys: Arc<KeyGenerator>,
}

impl DocumentStorage {
    pub fn new(location: DatabaseLocation) -> Self {
        Self {
            slot: ConnectionSlot::new(location),
            keys: Arc::new(KeyGenerator::new()),
        }
    }

    /// Run `f` with one pooled connection on the blocking pool
    async fn run<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection, &KeyGenerator) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let keys = Arc::clone(&self.keys);
        self.slot
            .run(move |db| {
                let conn = db.get_conn()?;
                f(&conn, &keys)
            })
            .await
    }
}

// ============================================================================
// Document helpers
// ============================================================================

/// Find a document by id: as a document key first, then by numeric `id` field
fn resolve(conn: &Connection, collection: Collection, id: &RecordId) -> StorageResult<Option<Document>> {
    match parse_key(id.as_str()) {
        Ok(key) => collection::find_by_key(conn, collection, &key),
        Err(e) => {
            debug!(
                "{} is not a document key ({}), looking up {} by numeric id",
                id,
                e,
                collection.as_str()
            );
            let Some(legacy_id) = id.as_i64() else {
                return Ok(None);
            };
            let mut found = collection::find_by_field(conn, collection, "id", &legacy_id)?;
            Ok(if found.is_empty() {
                None
            } else {
                Some(found.swap_remove(0))
            })
        }
    }
}

fn load<T: DeserializeOwned>(conn: &Connection, collection: Collection, id: &RecordId) -> StorageResult<Option<T>> {
    resolve(conn, collection, id)?
        .map(|doc| from_document(collection, doc))
        .transpose()
}

fn list<T: DeserializeOwned>(conn: &Connection, collection: Collection) -> StorageResult<Vec<T>> {
    collection::find_all(conn, collection)?
        .into_iter()
        .map(|doc| from_document(collection, doc))
        .collect()
}

fn list_by_parent<T: DeserializeOwned>(
    conn: &Connection,
    collection: Collection,
    field: &str,
    parent: &RecordId,
) -> StorageResult<Vec<T>> {
    collection::find_by_field(conn, collection, field, &parent.as_str())?
        .into_iter()
        .map(|doc| from_document(collection, doc))
        .collect()
}

/// Insert a new entity under a fresh key
fn insert_new<T: Serialize>(
    conn: &Connection,
    keys: &KeyGenerator,
    collection: Collection,
    build: impl FnOnce(RecordId) -> T,
) -> StorageResult<T> {
    let key = keys.next_key();
    let entity = build(RecordId::from(key.clone()));
    collection::insert(conn, collection, &key, &to_body(&entity)?)?;
    Ok(entity)
}

/// Insert or replace the single document of a collection
fn upsert_single<T: Serialize>(
    conn: &Connection,
    keys: &KeyGenerator,
    collection: Collection,
    build: impl FnOnce(RecordId, Option<Document>) -> StorageResult<T>,
) -> StorageResult<T> {
    match collection::first(conn, collection)? {
        Some(doc) => {
            let key = doc.key.clone();
            let entity = build(RecordId::from(key.clone()), Some(doc))?;
            collection::replace(conn, collection, &key, &to_body(&entity)?)?;
            Ok(entity)
        }
        None => {
            let key = keys.next_key();
            let entity = build(RecordId::from(key.clone()), None)?;
            collection::insert(conn, collection, &key, &to_body(&entity)?)?;
            Ok(entity)
        }
    }
}

fn load_detail(conn: &Connection, workout: Workout) -> StorageResult<WorkoutWithExercises> {
    let mut entries: Vec<WorkoutExercise> =
        list_by_parent(conn, Collection::WorkoutExercises, "workoutId", &workout.id)?;
    entries.sort_by_key(|e| e.order_index);

    let mut exercises = Vec::with_capacity(entries.len());
    for entry in entries {
        let exercise = load(conn, Collection::Exercises, &entry.exercise_id)?;
        let mut sets: Vec<WorkoutSet> =
            list_by_parent(conn, Collection::Sets, "workoutExerciseId", &entry.id)?;
        sets.sort_by_key(|s| s.set_number);
        exercises.push(WorkoutExerciseDetail {
            entry,
            exercise,
            sets,
        });
    }

    Ok(WorkoutWithExercises { workout, exercises })
}

/// Write the workout, then each entry, then its sets. Every written document
/// is recorded in `written` so the caller can undo a partial write.
fn write_workout_documents(
    conn: &Connection,
    keys: &KeyGenerator,
    data: &WorkoutCreate,
    exercises: Vec<Exercise>,
    written: &mut Vec<(Collection, String)>,
) -> StorageResult<WorkoutWithExercises> {
    let now = Utc::now();
    let workout = insert_new(conn, keys, Collection::Workouts, |id| data.to_workout(id, now))?;
    written.push((Collection::Workouts, workout.id.to_string()));

    let mut details = Vec::with_capacity(exercises.len());
    for (order_index, (entry_data, exercise)) in data.exercises.iter().zip(exercises).enumerate() {
        let entry = insert_new(conn, keys, Collection::WorkoutExercises, |id| WorkoutExercise {
            id,
            workout_id: workout.id.clone(),
            exercise_id: exercise.id.clone(),
            order_index: order_index as i64,
        })?;
        written.push((Collection::WorkoutExercises, entry.id.to_string()));

        let mut sets = Vec::with_capacity(entry_data.sets.len());
        for (i, set_data) in entry_data.sets.iter().enumerate() {
            let set = insert_new(conn, keys, Collection::Sets, |id| {
                set_data.to_set(id, entry.id.clone(), i as i64 + 1)
            })?;
            written.push((Collection::Sets, set.id.to_string()));
            sets.push(set);
        }

        details.push(WorkoutExerciseDetail {
            entry,
            exercise: Some(exercise),
            sets,
        });
    }

    Ok(WorkoutWithExercises {
        workout,
        exercises: details,
    })
}

/// Remove documents in reverse write order. Failures are logged, not returned.
fn remove_documents(conn: &Connection, written: &[(Collection, String)]) {
    for (collection, key) in written.iter().rev() {
        if let Err(e) = collection::delete(conn, *collection, key) {
            warn!(
                "Failed to remove {} document {} during cleanup: {}",
                collection.as_str(),
                key,
                e
            );
        }
    }
}

// ============================================================================
// Seeding
// ============================================================================

fn seed_if_empty<D, T: Serialize>(
    conn: &Connection,
    keys: &KeyGenerator,
    collection: Collection,
    items: Vec<D>,
    build: impl Fn(D, RecordId) -> T,
) -> StorageResult<()> {
    if collection::count(conn, collection)? > 0 {
        return Ok(());
    }

    for (n, data) in items.into_iter().enumerate() {
        let key = keys.next_key();
        let entity = build(data, RecordId::from(key.clone()));
        let mut body = to_body(&entity)?;
        if let Value::Object(map) = &mut body {
            map.insert("id".to_string(), Value::from(n as i64 + 1));
        }
        collection::insert(conn, collection, &key, &body)?;
    }
    info!("Seeded {} documents", collection.as_str());
    Ok(())
}

fn seed_documents(db: &Database, keys: &KeyGenerator) -> StorageResult<()> {
    let conn = db.get_conn()?;
    let now = Utc::now();

    seed_if_empty(&conn, keys, Collection::Exercises, seed::exercises(), |d, id| {
        d.into_exercise(id)
    })?;
    seed_if_empty(&conn, keys, Collection::Recipes, seed::recipes(), |d, id| {
        d.into_recipe(id, now)
    })?;
    seed_if_empty(&conn, keys, Collection::Quotes, seed::quotes(), |d, id| d.into_quote(id))?;
    seed_if_empty(&conn, keys, Collection::Challenges, seed::challenges(now), |d, id| {
        d.into_challenge(id, now)
    })?;
    Ok(())
}

#[async_trait]
impl Storage for DocumentStorage {
    fn backend_name(&self) -> &'static str {
        "document"
    }

    async fn connect(&self) -> StorageResult<()> {
        let keys = Arc::clone(&self.keys);
        if self.slot.connect(move |db| seed_documents(db, &keys)).await? {
            info!("Document storage ready at {}", self.slot.location());
        }
        Ok(())
    }

    async fn disconnect(&self) -> StorageResult<()> {
        if self.slot.disconnect().await {
            info!("Document storage disconnected");
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
        self.run(|conn, _| list(conn, Collection::Exercises)).await
    }

    async fn get_exercise_by_id(&self, id: &RecordId) -> StorageResult<Option<Exercise>> {
        let id = id.clone();
        self.run(move |conn, _| load(conn, Collection::Exercises, &id))
            .await
    }

    async fn create_exercise(&self, data: ExerciseCreate) -> StorageResult<Exercise> {
        self.run(move |conn, keys| {
            insert_new(conn, keys, Collection::Exercises, |id| data.into_exercise(id))
        })
        .await
    }

    // ------------------------------------------------------------------
    // Workouts
    // ------------------------------------------------------------------

    async fn get_all_workouts(&self) -> StorageResult<Vec<Workout>> {
        let workouts = self.run(|conn, _| list(conn, Collection::Workouts)).await?;
        Ok(newest_first(workouts, |w: &Workout| w.date))
    }

    async fn get_workout_by_id(
        &self,
        id: &RecordId,
    ) -> StorageResult<Option<WorkoutWithExercises>> {
        let id = id.clone();
        self.run(move |conn, _| {
            load(conn, Collection::Workouts, &id)?
                .map(|workout| load_detail(conn, workout))
                .transpose()
        })
        .await
    }

    async fn create_workout(&self, data: WorkoutCreate) -> StorageResult<WorkoutWithExercises> {
        self.run(move |conn, keys| {
            let mut exercises = Vec::with_capacity(data.exercises.len());
            for entry in &data.exercises {
                match load::<Exercise>(conn, Collection::Exercises, &entry.exercise_id)? {
                    Some(exercise) => exercises.push(exercise),
                    None => {
                        return Err(StorageError::InvalidReference {
                            entity: "exercise",
                            id: entry.exercise_id.clone(),
                        })
                    }
                }
            }

            let mut written = Vec::new();
            match write_workout_documents(conn, keys, &data, exercises, &mut written) {
                Ok(detail) => Ok(detail),
                Err(e) => {
                    warn!(
                        "Workout write failed after {} documents, removing them: {}",
                        written.len(),
                        e
                    );
                    remove_documents(conn, &written);
                    Err(e)
                }
            }
        })
        .await
    }

    async fn update_workout(
        &self,
        id: &RecordId,
        data: WorkoutUpdate,
    ) -> StorageResult<Option<Workout>> {
        let id = id.clone();
        self.run(move |conn, _| {
            let Some(mut workout) = load::<Workout>(conn, Collection::Workouts, &id)? else {
                return Ok(None);
            };
            data.apply(&mut workout);
            collection::replace(
                conn,
                Collection::Workouts,
                workout.id.as_str(),
                &to_body(&workout)?,
            )?;
            Ok(Some(workout))
        })
        .await
    }

    async fn delete_workout(&self, id: &RecordId) -> StorageResult<bool> {
        let id = id.clone();
        self.run(move |conn, _| {
            let Some(doc) = resolve(conn, Collection::Workouts, &id)? else {
                return Ok(false);
            };
            let workout_id = RecordId::from(doc.key.clone());

            let entries =
                collection::find_by_field(conn, Collection::WorkoutExercises, "workoutId", &workout_id.as_str())?;
            for entry in entries {
                let sets = collection::find_by_field(
                    conn,
                    Collection::Sets,
                    "workoutExerciseId",
                    &entry.key.as_str(),
                )?;
                for set in sets {
                    collection::delete(conn, Collection::Sets, &set.key)?;
                }
                collection::delete(conn, Collection::WorkoutExercises, &entry.key)?;
            }

            collection::delete(conn, Collection::Workouts, &doc.key)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Meals and recipes
    // ------------------------------------------------------------------

    async fn create_meal(&self, data: MealCreate) -> StorageResult<Meal> {
        let now = Utc::now();
        self.run(move |conn, keys| {
            insert_new(conn, keys, Collection::Meals, |id| data.into_meal(id, now))
        })
        .await
    }

    async fn get_meals_by_date(&self, date: NaiveDate) -> StorageResult<Vec<Meal>> {
        let meals: Vec<Meal> = self.run(|conn, _| list(conn, Collection::Meals)).await?;
        let mut meals: Vec<Meal> = meals.into_iter().filter(|m| m.is_on(date)).collect();
        meals.sort_by_key(|m| m.date);
        Ok(meals)
    }

    async fn get_all_meals(&self) -> StorageResult<Vec<Meal>> {
        let meals = self.run(|conn, _| list(conn, Collection::Meals)).await?;
        Ok(newest_first(meals, |m: &Meal| m.date))
    }

    async fn get_all_recipes(&self) -> StorageResult<Vec<Recipe>> {
        self.run(|conn, _| list(conn, Collection::Recipes)).await
    }

    async fn create_recipe(&self, data: RecipeCreate) -> StorageResult<Recipe> {
        let now = Utc::now();
        self.run(move |conn, keys| {
            insert_new(conn, keys, Collection::Recipes, |id| data.into_recipe(id, now))
        })
        .await
    }

    // ------------------------------------------------------------------
    // Nutrition goal, weight and profile
    // ------------------------------------------------------------------

    async fn get_nutrition_goals(&self) -> StorageResult<Option<NutritionGoal>> {
        self.run(|conn, _| {
            collection::first(conn, Collection::NutritionGoals)?
                .map(|doc| from_document(Collection::NutritionGoals, doc))
                .transpose()
        })
        .await
    }

    async fn update_nutrition_goals(
        &self,
        data: NutritionGoalUpdate,
    ) -> StorageResult<NutritionGoal> {
        let now = Utc::now();
        self.run(move |conn, keys| {
            upsert_single(conn, keys, Collection::NutritionGoals, |id, existing| {
                let created_at = match existing {
                    Some(doc) => {
                        from_document::<NutritionGoal>(Collection::NutritionGoals, doc)?.created_at
                    }
                    None => now,
                };
                Ok(data.into_goal(id, created_at, now))
            })
        })
        .await
    }

    async fn create_weight_entry(&self, data: WeightEntryCreate) -> StorageResult<WeightEntry> {
        let now = Utc::now();
        self.run(move |conn, keys| {
            insert_new(conn, keys, Collection::WeightEntries, |id| data.into_entry(id, now))
        })
        .await
    }

    async fn get_weight_entries(&self) -> StorageResult<Vec<WeightEntry>> {
        let entries = self.run(|conn, _| list(conn, Collection::WeightEntries)).await?;
        Ok(newest_first(entries, |w: &WeightEntry| w.date))
    }

    async fn get_latest_weight(&self) -> StorageResult<Option<WeightEntry>> {
        Ok(self.get_weight_entries().await?.into_iter().next())
    }

    async fn get_user_profile(&self) -> StorageResult<Option<UserProfile>> {
        self.run(|conn, _| {
            collection::first(conn, Collection::UserProfile)?
                .map(|doc| from_document(Collection::UserProfile, doc))
                .transpose()
        })
        .await
    }

    async fn update_user_profile(&self, data: UserProfileUpdate) -> StorageResult<UserProfile> {
        let now = Utc::now();
        self.run(move |conn, keys| {
            upsert_single(conn, keys, Collection::UserProfile, |id, existing| {
                let created_at = match existing {
                    Some(doc) => from_document::<UserProfile>(Collection::UserProfile, doc)?.created_at,
                    None => now,
                };
                Ok(data.into_profile(id, created_at, now))
            })
        })
        .await
    }

    // ------------------------------------------------------------------
    // Motivation
    // ------------------------------------------------------------------

    async fn get_random_quote(&self) -> StorageResult<Option<MotivationalQuote>> {
        let quotes: Vec<MotivationalQuote> =
            self.run(|conn, _| list(conn, Collection::Quotes)).await?;
        Ok(quotes.choose(&mut rand::thread_rng()).cloned())
    }

    async fn get_quotes_by_category(
        &self,
        category: QuoteCategory,
    ) -> StorageResult<Vec<MotivationalQuote>> {
        self.run(move |conn, _| {
            collection::find_by_field(conn, Collection::Quotes, "category", &category.as_str())?
                .into_iter()
                .map(|doc| from_document(Collection::Quotes, doc))
                .collect()
        })
        .await
    }

    async fn get_challenge_for_date(
        &self,
        date: NaiveDate,
    ) -> StorageResult<Option<DailyChallenge>> {
        let challenges = self.get_all_challenges().await?;
        Ok(challenges.into_iter().find(|c| c.is_on(date)))
    }

    async fn get_all_challenges(&self) -> StorageResult<Vec<DailyChallenge>> {
        self.run(|conn, _| list(conn, Collection::Challenges)).await
    }

    async fn create_challenge(&self, data: ChallengeCreate) -> StorageResult<DailyChallenge> {
        let now = Utc::now();
        self.run(move |conn, keys| {
            insert_new(conn, keys, Collection::Challenges, |id| data.into_challenge(id, now))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SetCreate, WorkoutExerciseCreate};
    use serde_json::json;

    async fn storage() -> DocumentStorage {
        let storage = DocumentStorage::new(DatabaseLocation::Memory);
        storage.connect().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_ids_are_document_keys() {
        let storage = storage().await;
        let exercises = storage.get_all_exercises().await.unwrap();
        assert_eq!(exercises.len(), seed::exercises().len());
        for exercise in &exercises {
            assert_eq!(exercise.id.as_str().len(), 24);
            assert!(parse_key(exercise.id.as_str()).is_ok());
        }
    }

    async fn child_documents(storage: &DocumentStorage) -> (i64, i64) {
        storage
            .run(|conn, _| {
                let entries = collection::count(conn, Collection::WorkoutExercises)?;
                let sets = collection::count(conn, Collection::Sets)?;
                Ok((entries, sets))
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_delete_workout_removes_entry_and_set_documents() {
        let storage = storage().await;
        let exercises = storage.get_all_exercises().await.unwrap();
        let payload: WorkoutCreate = serde_json::from_value(json!({
            "name": "Full body",
            "date": "2024-05-01T10:00:00Z",
            "exercises": [
                {"exerciseId": exercises[0].id.as_str(), "sets": [{"weight": "60", "reps": 8}, {"weight": "60", "reps": 8}]},
                {"exerciseId": exercises[1].id.as_str(), "sets": [{"weight": "80", "reps": 5}]}
            ]
        }))
        .unwrap();
        let created = storage.create_workout(payload).await.unwrap();
        assert_eq!(child_documents(&storage).await, (2, 3));

        assert!(storage.delete_workout(&created.workout.id).await.unwrap());
        assert_eq!(child_documents(&storage).await, (0, 0));
    }

    #[tokio::test]
    async fn test_invalid_key_falls_back_to_numeric_id() {
        let storage = storage().await;
        let by_number = storage
            .get_exercise_by_id(&RecordId::from(2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_number.name, "Squats");

        let by_key = storage.get_exercise_by_id(&by_number.id).await.unwrap();
        assert_eq!(by_key, Some(by_number));

        assert!(storage
            .get_exercise_by_id(&RecordId::from(99))
            .await
            .unwrap()
            .is_none());
        assert!(storage
            .get_exercise_by_id(&RecordId::new("not-a-key"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_workout_entries_reference_canonical_keys() {
        let storage = storage().await;
        let created = storage
            .create_workout(WorkoutCreate {
                name: "Legs".into(),
                date: Utc::now(),
                duration: None,
                notes: None,
                gender: Default::default(),
                exercises: vec![WorkoutExerciseCreate {
                    exercise_id: RecordId::from(2),
                    sets: vec![SetCreate {
                        weight: Some("225".parse().unwrap()),
                        reps: Some(5),
                        completed: true,
                    }],
                }],
            })
            .await
            .unwrap();

        let entry = &created.exercises[0];
        assert_eq!(entry.exercise.as_ref().map(|e| &e.id), Some(&entry.entry.exercise_id));
        assert!(parse_key(entry.entry.exercise_id.as_str()).is_ok());

        let loaded = storage.get_workout_by_id(&created.workout.id).await.unwrap();
        assert_eq!(loaded, Some(created));
    }

    #[tokio::test]
    async fn test_legacy_documents_are_readable() {
        let storage = storage().await;
        storage
            .run(|conn, keys| {
                collection::insert(
                    conn,
                    Collection::Exercises,
                    &keys.next_key(),
                    &json!({
                        "id": 42,
                        "exercise_name": "Cable Crunch",
                        "muscle_group": "Abs",
                        "difficulty_level": "hard"
                    }),
                )
            })
            .await
            .unwrap();

        let exercise = storage
            .get_exercise_by_id(&RecordId::from(42))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exercise.name, "Cable Crunch");
        assert_eq!(exercise.category, "core");
        assert_eq!(exercise.muscle_groups, vec!["Abs"]);
    }

    #[tokio::test]
    async fn test_partial_write_is_removed() {
        let storage = storage().await;
        let exercise = storage.get_all_exercises().await.unwrap().remove(0);
        let data = WorkoutCreate {
            name: "Doomed".into(),
            date: Utc::now(),
            duration: None,
            notes: None,
            gender: Default::default(),
            exercises: vec![WorkoutExerciseCreate {
                exercise_id: exercise.id.clone(),
                sets: Vec::new(),
            }],
        };

        let outcome = storage
            .run(move |conn, keys| {
                // A trigger makes every entry insert fail after the workout is written
                conn.execute_batch(
                    r#"
                    CREATE TEMP TRIGGER reject_entries BEFORE INSERT ON documents
                    WHEN NEW.collection = 'workout_exercises'
                    BEGIN SELECT RAISE(ABORT, 'rejected'); END;
                    "#,
                )?;
                let mut written = Vec::new();
                let result = write_workout_documents(conn, keys, &data, vec![exercise], &mut written);
                let count_before = written.len();
                if result.is_err() {
                    remove_documents(conn, &written);
                }
                conn.execute_batch("DROP TRIGGER reject_entries")?;
                Ok((result.is_err(), count_before))
            })
            .await
            .unwrap();

        assert_eq!(outcome, (true, 1));
        assert!(storage.get_all_workouts().await.unwrap().is_empty());
    }
}
