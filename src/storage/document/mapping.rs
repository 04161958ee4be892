//! Document ↔ entity mapping
//!
//! Bodies are the entity's JSON without its `id`; the document key becomes
//! the id on the way out. Missing fields get the same defaults the create
//! payloads apply, and exercise documents written with the older
//! `exercise_name` / `muscle_group` / `difficulty_level` layout are mapped
//! onto the current shape.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::collection::{Collection, Document};
use crate::models::Difficulty;
use crate::storage::{StorageError, StorageResult};

/// Entity JSON without its id
pub fn to_body<T: Serialize>(entity: &T) -> StorageResult<Value> {
    let mut body = serde_json::to_value(entity)?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
    }
    Ok(body)
}

/// Map a stored document to an entity, filling defaults
pub fn from_document<T: DeserializeOwned>(collection: Collection, doc: Document) -> StorageResult<T> {
    let Document { key, body } = doc;
    let Value::Object(mut map) = body else {
        return Err(corrupt(collection, key, "body is not an object".to_string()));
    };

    if collection == Collection::Exercises {
        normalize_exercise(&mut map);
    }
    for (field, value) in defaults(collection) {
        if map.get(field).map_or(true, Value::is_null) {
            map.insert(field.to_string(), value);
        }
    }
    map.insert("id".to_string(), Value::String(key.clone()));

    serde_json::from_value(Value::Object(map)).map_err(|e| corrupt(collection, key, e.to_string()))
}

fn corrupt(collection: Collection, key: String, reason: String) -> StorageError {
    StorageError::CorruptDocument {
        collection: collection.as_str(),
        key,
        reason,
    }
}

fn defaults(collection: Collection) -> Vec<(&'static str, Value)> {
    match collection {
        Collection::Exercises => vec![
            ("category", Value::from("general")),
            ("difficulty", Value::from("beginner")),
            ("muscleGroups", Value::Array(Vec::new())),
            ("equipment", Value::Array(Vec::new())),
        ],
        Collection::Workouts => vec![("gender", Value::from("male"))],
        Collection::Sets => vec![("completed", Value::from(1))],
        Collection::Recipes => vec![
            ("servings", Value::from(1)),
            ("ingredients", Value::Array(Vec::new())),
            ("tags", Value::Array(Vec::new())),
        ],
        Collection::NutritionGoals => vec![
            ("weightGoal", Value::from("maintain")),
            ("activityLevel", Value::from("moderate")),
        ],
        Collection::WeightEntries => vec![("unit", Value::from("lbs"))],
        Collection::UserProfile => vec![
            ("heightUnit", Value::from("inches")),
            ("gender", Value::from("male")),
        ],
        Collection::Challenges => vec![("points", Value::from(10))],
        Collection::WorkoutExercises | Collection::Meals | Collection::Quotes => Vec::new(),
    }
}

// ============================================================================
// Legacy exercise layout
// ============================================================================

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Category for the primary muscle of a legacy exercise
pub fn category_for_muscle(muscle: &str) -> &'static str {
    let muscle = muscle.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| muscle.contains(n));

    if has(&["chest", "pectoral"]) {
        "chest"
    } else if has(&["back", "lats", "rhomboids", "trap"]) {
        "back"
    } else if has(&["shoulder", "deltoid"]) {
        "shoulders"
    } else if has(&["bicep", "tricep", "forearm"]) {
        "arms"
    } else if has(&["quad", "hamstring", "glute", "calf"]) {
        "legs"
    } else if has(&["abs", "core", "oblique"]) {
        "core"
    } else if has(&["cardio", "aerobic"]) {
        "cardio"
    } else {
        "general"
    }
}

/// Difficulty for a free-text legacy level
pub fn difficulty_for_level(level: &str) -> Difficulty {
    let level = level.to_lowercase();
    if ["advanced", "expert", "hard"].iter().any(|n| level.contains(n)) {
        Difficulty::Advanced
    } else if ["intermediate", "medium"].iter().any(|n| level.contains(n)) {
        Difficulty::Intermediate
    } else {
        Difficulty::Beginner
    }
}

fn normalize_exercise(map: &mut Map<String, Value>) {
    let legacy_name = map.remove("exercise_name");
    if !map.get("name").is_some_and(Value::is_string) {
        let name = legacy_name.unwrap_or_else(|| Value::from("Unknown Exercise"));
        map.insert("name".to_string(), name);
    }

    let muscles = map.remove("muscle_group").map(|v| string_list(&v));
    if let Some(muscles) = muscles {
        if !map.contains_key("category") {
            let primary = muscles.first().map_or("", String::as_str);
            map.insert("category".to_string(), Value::from(category_for_muscle(primary)));
        }
        if !map.contains_key("muscleGroups") {
            map.insert("muscleGroups".to_string(), Value::from(muscles));
        }
    }

    if let Some(function) = map.remove("primary_function") {
        if map.get("instructions").map_or(true, Value::is_null) {
            map.insert("instructions".to_string(), function);
        }
    }

    if let Some(level) = map.remove("difficulty_level") {
        if !map.contains_key("difficulty") {
            let difficulty = difficulty_for_level(level.as_str().unwrap_or_default());
            map.insert("difficulty".to_string(), Value::from(difficulty.as_str()));
        }
    }

    if let Some(equipment) = map.get("equipment") {
        if !equipment.is_array() && !equipment.is_null() {
            let list = string_list(equipment);
            map.insert("equipment".to_string(), Value::from(list));
        }
    }
}
