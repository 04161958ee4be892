//! Raw collection access
//!
//! Documents live in one `documents` table keyed by `(collection, key)`.
//! Listing follows insertion order.

use rusqlite::{params, Connection, OptionalExtension, ToSql};
use serde_json::Value;

use crate::storage::{StorageError, StorageResult};

/// Named document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Exercises,
    Workouts,
    WorkoutExercises,
    Sets,
    Meals,
    Recipes,
    NutritionGoals,
    WeightEntries,
    UserProfile,
    Quotes,
    Challenges,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Exercises => "exercises",
            Collection::Workouts => "workouts",
            Collection::WorkoutExercises => "workout_exercises",
            Collection::Sets => "sets",
            Collection::Meals => "meals",
            Collection::Recipes => "recipes",
            Collection::NutritionGoals => "nutrition_goals",
            Collection::WeightEntries => "weight_entries",
            Collection::UserProfile => "user_profile",
            Collection::Quotes => "motivational_quotes",
            Collection::Challenges => "daily_challenges",
        }
    }
}

/// A stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub body: Value,
}

fn parse(collection: Collection, key: String, body: &str) -> StorageResult<Document> {
    match serde_json::from_str(body) {
        Ok(body) => Ok(Document { key, body }),
        Err(e) => Err(StorageError::CorruptDocument {
            collection: collection.as_str(),
            key,
            reason: e.to_string(),
        }),
    }
}

fn collect(
    collection: Collection,
    rows: Vec<(String, String)>,
) -> StorageResult<Vec<Document>> {
    rows.into_iter()
        .map(|(key, body)| parse(collection, key, &body))
        .collect()
}

pub fn insert(conn: &Connection, collection: Collection, key: &str, body: &Value) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO documents (collection, key, body) VALUES (?1, ?2, ?3)",
        params![collection.as_str(), key, body.to_string()],
    )?;
    Ok(())
}

/// Overwrite a document body. `false` if the key doesn't exist.
pub fn replace(conn: &Connection, collection: Collection, key: &str, body: &Value) -> StorageResult<bool> {
    let rows = conn.execute(
        "UPDATE documents SET body = ?3 WHERE collection = ?1 AND key = ?2",
        params![collection.as_str(), key, body.to_string()],
    )?;
    Ok(rows > 0)
}

pub fn find_by_key(conn: &Connection, collection: Collection, key: &str) -> StorageResult<Option<Document>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND key = ?2",
            params![collection.as_str(), key],
            |row| row.get(0),
        )
        .optional()?;

    body.map(|body| parse(collection, key.to_string(), &body))
        .transpose()
}

/// Documents whose top-level `field` equals `value`, in insertion order
pub fn find_by_field(
    conn: &Connection,
    collection: Collection,
    field: &str,
    value: &dyn ToSql,
) -> StorageResult<Vec<Document>> {
    let path = format!("$.{field}");
    let mut stmt = conn.prepare(
        r#"
        SELECT key, body FROM documents
        WHERE collection = ?1 AND json_extract(body, ?2) = ?3
        ORDER BY rowid
        "#,
    )?;
    let rows = stmt
        .query_map(params![collection.as_str(), path, value], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    collect(collection, rows)
}

/// Every document in insertion order
pub fn find_all(conn: &Connection, collection: Collection) -> StorageResult<Vec<Document>> {
    let mut stmt =
        conn.prepare("SELECT key, body FROM documents WHERE collection = ?1 ORDER BY rowid")?;
    let rows = stmt
        .query_map([collection.as_str()], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    collect(collection, rows)
}

/// The earliest inserted document
pub fn first(conn: &Connection, collection: Collection) -> StorageResult<Option<Document>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT key, body FROM documents WHERE collection = ?1 ORDER BY rowid LIMIT 1",
            [collection.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    row.map(|(key, body)| parse(collection, key, &body))
        .transpose()
}

pub fn delete(conn: &Connection, collection: Collection, key: &str) -> StorageResult<bool> {
    let rows = conn.execute(
        "DELETE FROM documents WHERE collection = ?1 AND key = ?2",
        params![collection.as_str(), key],
    )?;
    Ok(rows > 0)
}

pub fn count(conn: &Connection, collection: Collection) -> StorageResult<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM documents WHERE collection = ?1",
        [collection.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}
