//! The same behavioural suite, run against every backend

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use super::*;
use crate::models::{ActivityLevel, Difficulty, WeightGoal};

fn memory() -> Arc<dyn Storage> {
    Arc::new(MemStorage::new())
}

fn document() -> Arc<dyn Storage> {
    Arc::new(DocumentStorage::new(DatabaseLocation::Memory))
}

fn mapped() -> Arc<dyn Storage> {
    Arc::new(MappedStorage::new(DatabaseLocation::Memory))
}

async fn connected(storage: Arc<dyn Storage>) -> Arc<dyn Storage> {
    storage.connect().await.unwrap();
    storage
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn workout_payload(
    name: &str,
    date: DateTime<Utc>,
    exercise_ids: &[&RecordId],
) -> WorkoutCreate {
    let exercises: Vec<_> = exercise_ids
        .iter()
        .map(|id| {
            json!({
                "exerciseId": id.as_str(),
                "sets": [
                    {"weight": "100", "reps": 10},
                    {"weight": "100", "reps": 10, "completed": false}
                ]
            })
        })
        .collect();
    serde_json::from_value(json!({
        "name": name,
        "date": date.to_rfc3339(),
        "duration": 40,
        "exercises": exercises,
    }))
    .unwrap()
}

async fn two_exercise_ids(storage: &dyn Storage) -> (RecordId, RecordId) {
    let exercises = storage.get_all_exercises().await.unwrap();
    (exercises[0].id.clone(), exercises[1].id.clone())
}

// ============================================================================
// Properties
// ============================================================================

async fn connect_is_idempotent(storage: Arc<dyn Storage>) {
    storage.connect().await.unwrap();
    let count = storage.get_all_exercises().await.unwrap().len();
    storage.connect().await.unwrap();
    assert!(storage.is_connected().await);
    assert_eq!(storage.get_all_exercises().await.unwrap().len(), count);

    storage.disconnect().await.unwrap();
    assert!(!storage.is_connected().await);
    storage.disconnect().await.unwrap();
    assert!(!storage.is_connected().await);
}

async fn exercise_round_trip_with_defaults(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    let data: ExerciseCreate =
        serde_json::from_value(json!({"name": "Plank", "category": "core"})).unwrap();

    let created = storage.create_exercise(data).await.unwrap();
    assert_eq!(created.difficulty, Difficulty::Beginner);
    assert!(created.muscle_groups.is_empty());
    assert!(created.equipment.is_empty());
    assert_eq!(created.instructions, None);

    let loaded = storage.get_exercise_by_id(&created.id).await.unwrap();
    assert_eq!(loaded.as_ref(), Some(&created));

    let all = storage.get_all_exercises().await.unwrap();
    assert_eq!(all.last(), Some(&created));
}

async fn unknown_ids_are_not_found(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    for raw in ["999999", "nope", "ffffffffffffffffffffffff"] {
        let id = RecordId::new(raw);
        assert!(storage.get_exercise_by_id(&id).await.unwrap().is_none());
        assert!(storage.get_workout_by_id(&id).await.unwrap().is_none());
        assert!(storage
            .update_workout(&id, WorkoutUpdate::default())
            .await
            .unwrap()
            .is_none());
        assert!(!storage.delete_workout(&id).await.unwrap());
    }
}

async fn workout_lifecycle(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    let (first, second) = two_exercise_ids(storage.as_ref()).await;

    let created = storage
        .create_workout(workout_payload("Full body", Utc::now(), &[&first, &second]))
        .await
        .unwrap();

    assert_eq!(created.exercises.len(), 2);
    assert_eq!(created.exercises[0].entry.order_index, 0);
    assert_eq!(created.exercises[1].entry.order_index, 1);
    assert_eq!(created.exercises[0].entry.exercise_id, first);
    assert_eq!(
        created.exercises[1].exercise.as_ref().map(|e| &e.id),
        Some(&second)
    );
    let set_numbers: Vec<i64> = created.exercises[0].sets.iter().map(|s| s.set_number).collect();
    assert_eq!(set_numbers, vec![1, 2]);
    assert!(created.exercises[0].sets[0].completed);
    assert!(!created.exercises[0].sets[1].completed);

    let loaded = storage.get_workout_by_id(&created.workout.id).await.unwrap();
    assert_eq!(loaded.as_ref(), Some(&created));

    let update = WorkoutUpdate {
        notes: Some("felt strong".into()),
        ..Default::default()
    };
    let updated = storage
        .update_workout(&created.workout.id, update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.notes.as_deref(), Some("felt strong"));
    assert_eq!(updated.name, "Full body");
    assert_eq!(updated.created_at, created.workout.created_at);

    assert!(storage.delete_workout(&created.workout.id).await.unwrap());
    assert!(storage.get_workout_by_id(&created.workout.id).await.unwrap().is_none());
    assert!(!storage.delete_workout(&created.workout.id).await.unwrap());
    assert!(storage.get_all_workout_details().await.unwrap().is_empty());
}

async fn invalid_reference_writes_nothing(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    let (first, _) = two_exercise_ids(storage.as_ref()).await;
    let missing = RecordId::from(999_999);

    let err = storage
        .create_workout(workout_payload("Ghost", Utc::now(), &[&first, &missing]))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidReference { entity: "exercise", .. }));
    assert!(storage.get_all_workouts().await.unwrap().is_empty());
}

async fn workouts_newest_first(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    let (first, _) = two_exercise_ids(storage.as_ref()).await;

    let names = ["old", "tie-a", "tie-b", "newest"];
    let dates = [at(2024, 1, 1, 9), at(2024, 1, 5, 9), at(2024, 1, 5, 9), at(2024, 1, 9, 9)];
    for (name, date) in names.iter().zip(dates) {
        storage
            .create_workout(workout_payload(name, date, &[&first]))
            .await
            .unwrap();
    }

    let order: Vec<String> = storage
        .get_all_workouts()
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(order, vec!["newest", "tie-b", "tie-a", "old"]);

    let recent = storage.get_recent_workouts(2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[1].name, "tie-b");
}

async fn stats_are_computed_fresh(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    let (first, _) = two_exercise_ids(storage.as_ref()).await;

    let empty = storage.get_workout_stats().await.unwrap();
    assert_eq!(empty.weekly_workouts, 0);
    assert_eq!(empty.total_weight, Decimal::ZERO);

    storage
        .create_workout(workout_payload("Recent", Utc::now() - Duration::days(6), &[&first]))
        .await
        .unwrap();
    storage
        .create_workout(workout_payload("Old", Utc::now() - Duration::days(8), &[&first]))
        .await
        .unwrap();

    let stats = storage.get_workout_stats().await.unwrap();
    assert_eq!(stats.weekly_workouts, 1);
    assert_eq!(stats.total_weight, Decimal::from(2000));
    assert_eq!(stats.avg_duration, 40);
}

async fn decimals_round_trip(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    let (first, _) = two_exercise_ids(storage.as_ref()).await;

    let data: WorkoutCreate = serde_json::from_value(json!({
        "name": "Precise",
        "date": "2024-03-01",
        "exercises": [{"exerciseId": first.as_str(), "sets": [{"weight": "145.50", "reps": 3}]}]
    }))
    .unwrap();
    let created = storage.create_workout(data).await.unwrap();
    let loaded = storage
        .get_workout_by_id(&created.workout.id)
        .await
        .unwrap()
        .unwrap();
    let weight = loaded.exercises[0].sets[0].weight.map(|w| w.to_string());
    assert_eq!(weight.as_deref(), Some("145.50"));
}

async fn meals_by_day(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    let meal = |name: &str, date: DateTime<Utc>| -> MealCreate {
        serde_json::from_value(json!({
            "name": name,
            "type": "lunch",
            "date": date.to_rfc3339(),
            "calories": 500,
            "protein": "30.5"
        }))
        .unwrap()
    };

    storage.create_meal(meal("dinner", at(2024, 4, 2, 19))).await.unwrap();
    storage.create_meal(meal("breakfast", at(2024, 4, 2, 7))).await.unwrap();
    storage.create_meal(meal("next day", at(2024, 4, 3, 0))).await.unwrap();
    storage.create_meal(meal("day before", at(2024, 4, 1, 23))).await.unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
    let names: Vec<String> = storage
        .get_meals_by_date(day)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["breakfast", "dinner"]);

    let all: Vec<String> = storage
        .get_all_meals()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(all, vec!["next day", "dinner", "breakfast", "day before"]);
}

async fn goal_and_profile_upsert(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    assert!(storage.get_nutrition_goals().await.unwrap().is_none());
    assert!(storage.get_user_profile().await.unwrap().is_none());

    let goal = |calories: i64| -> NutritionGoalUpdate {
        serde_json::from_value(json!({
            "dailyCalories": calories,
            "dailyProtein": "150",
            "dailyCarbs": "200",
            "dailyFat": "70",
            "weightGoal": "lose"
        }))
        .unwrap()
    };
    let first = storage.update_nutrition_goals(goal(2200)).await.unwrap();
    assert_eq!(first.activity_level, ActivityLevel::Moderate);
    let second = storage.update_nutrition_goals(goal(2000)).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.weight_goal, WeightGoal::Lose);

    let stored = storage.get_nutrition_goals().await.unwrap().unwrap();
    assert_eq!(stored.daily_calories, 2000);

    let profile: UserProfileUpdate =
        serde_json::from_value(json!({"height": "70", "age": 30})).unwrap();
    let first = storage.update_user_profile(profile.clone()).await.unwrap();
    let second = storage
        .update_user_profile(UserProfileUpdate {
            age: Some(31),
            ..profile
        })
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(storage.get_user_profile().await.unwrap().unwrap().age, Some(31));
}

async fn weight_entries_newest_first(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    assert!(storage.get_latest_weight().await.unwrap().is_none());

    for (weight, day) in [("181.2", 1), ("180.4", 3), ("182.0", 2)] {
        let data: WeightEntryCreate = serde_json::from_value(json!({
            "weight": weight,
            "date": format!("2024-05-0{day}")
        }))
        .unwrap();
        storage.create_weight_entry(data).await.unwrap();
    }

    let weights: Vec<String> = storage
        .get_weight_entries()
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.weight.to_string())
        .collect();
    assert_eq!(weights, vec!["180.4", "182.0", "181.2"]);

    let latest = storage.get_latest_weight().await.unwrap().unwrap();
    assert_eq!(latest.weight.to_string(), "180.4");
}

async fn motivation_content(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    assert!(storage.get_random_quote().await.unwrap().is_some());

    let fitness = storage
        .get_quotes_by_category(QuoteCategory::Fitness)
        .await
        .unwrap();
    assert_eq!(fitness.len(), 1);
    assert_eq!(fitness[0].quote, "Champions train, losers complain.");

    let today = storage.get_todays_challenge().await.unwrap().unwrap();
    assert_eq!(today.title, "Perfect Push-Up Day");

    let data: ChallengeCreate = serde_json::from_value(json!({
        "title": "Leap day mile",
        "description": "Run one mile",
        "type": "workout",
        "difficulty": "easy",
        "date": "2024-02-29"
    }))
    .unwrap();
    let created = storage.create_challenge(data).await.unwrap();
    assert_eq!(created.points, 10);

    let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let found = storage.get_challenge_for_date(day).await.unwrap();
    assert_eq!(found, Some(created.clone()));

    let all = storage.get_all_challenges().await.unwrap();
    assert_eq!(all.last(), Some(&created));
}

async fn recipes_keep_insertion_order(storage: Arc<dyn Storage>) {
    let storage = connected(storage).await;
    let before = storage.get_all_recipes().await.unwrap();
    assert_eq!(before[0].name, "Protein Power Bowl");

    let data: RecipeCreate = serde_json::from_value(json!({
        "name": "Overnight oats",
        "instructions": "Soak overnight",
        "ingredients": ["oats", "milk"]
    }))
    .unwrap();
    let created = storage.create_recipe(data).await.unwrap();
    assert_eq!(created.servings, 1);
    assert!(created.tags.is_empty());

    let after = storage.get_all_recipes().await.unwrap();
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(after.last(), Some(&created));
}

// ============================================================================
// Per-backend instantiation
// ============================================================================

macro_rules! contract_suite {
    ($($backend:ident),* $(,)?) => {
        $(
            mod $backend {
                use super::*;

                #[tokio::test]
                async fn test_connect_is_idempotent() {
                    connect_is_idempotent(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_exercise_round_trip_with_defaults() {
                    exercise_round_trip_with_defaults(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_unknown_ids_are_not_found() {
                    unknown_ids_are_not_found(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_workout_lifecycle() {
                    workout_lifecycle(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_invalid_reference_writes_nothing() {
                    invalid_reference_writes_nothing(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_workouts_newest_first() {
                    workouts_newest_first(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_stats_are_computed_fresh() {
                    stats_are_computed_fresh(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_decimals_round_trip() {
                    decimals_round_trip(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_meals_by_day() {
                    meals_by_day(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_goal_and_profile_upsert() {
                    goal_and_profile_upsert(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_weight_entries_newest_first() {
                    weight_entries_newest_first(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_motivation_content() {
                    motivation_content(super::$backend()).await;
                }

                #[tokio::test]
                async fn test_recipes_keep_insertion_order() {
                    recipes_keep_insertion_order(super::$backend()).await;
                }
            }
        )*
    };
}

contract_suite!(memory, document, mapped);
