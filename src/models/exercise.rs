//! Exercise model
//!
//! Catalog entries referenced by workout exercise entries. Exercises are
//! immutable once created.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::sql;
use super::validation::{Checker, FieldError, Validate};
use super::RecordId;
use crate::db::DbResult;

/// Exercise difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

/// A catalog exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: RecordId,
    pub name: String,
    pub category: String,
    pub instructions: Option<String>,
    pub difficulty: Difficulty,
    pub muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
}

/// Data for creating a new exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseCreate {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
}

impl ExerciseCreate {
    /// Build the stored entity, with all defaults applied
    pub fn into_exercise(self, id: RecordId) -> Exercise {
        Exercise {
            id,
            name: self.name,
            category: self.category,
            instructions: self.instructions,
            difficulty: self.difficulty,
            muscle_groups: self.muscle_groups,
            equipment: self.equipment,
        }
    }
}

impl Validate for ExerciseCreate {
    const SUBJECT: &'static str = "exercise";

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Checker::default()
            .non_empty("name", &self.name)
            .non_empty("category", &self.category)
            .finish()
    }
}

// ============================================================================
// Table mapping
// ============================================================================

impl Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecordId::from(row.get::<_, i64>("id")?),
            name: row.get("name")?,
            category: row.get("category")?,
            instructions: row.get("instructions")?,
            difficulty: sql::variant(row, "difficulty", Difficulty::from_str)?,
            muscle_groups: sql::json(row, "muscle_groups")?,
            equipment: sql::json(row, "equipment")?,
        })
    }

    /// Insert a new exercise
    pub fn insert(conn: &Connection, data: &ExerciseCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO exercises (name, category, instructions, difficulty, muscle_groups, equipment)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.name,
                data.category,
                data.instructions,
                data.difficulty.as_str(),
                sql::json_text(&data.muscle_groups),
                sql::json_text(&data.equipment),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get an exercise by row id
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM exercises WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(exercise) => Ok(Some(exercise)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All exercises in insertion order
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM exercises ORDER BY id")?;
        let exercises = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))?;
        Ok(count)
    }
}
