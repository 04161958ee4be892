//! Workout model
//!
//! A workout owns an ordered list of exercise entries, and each entry owns an
//! ordered list of sets. Deleting a workout removes both levels.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::serde_helpers::{completed_flag, datetime_input, optional_datetime_input, yes};
use super::validation::{Checker, FieldError, Validate, MAX_DURATION_MINUTES, MAX_REPS};
use super::{sql, Exercise, Gender, RecordId};
use crate::db::DbResult;

/// A workout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: RecordId,
    pub name: String,
    pub date: DateTime<Utc>,
    /// Minutes
    pub duration: Option<i64>,
    pub notes: Option<String>,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
}

/// One exercise slot within a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub id: RecordId,
    pub workout_id: RecordId,
    pub exercise_id: RecordId,
    pub order_index: i64,
}

/// One set of an exercise entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub id: RecordId,
    pub workout_exercise_id: RecordId,
    /// 1-based
    pub set_number: i64,
    pub weight: Option<Decimal>,
    pub reps: Option<i64>,
    #[serde(with = "completed_flag")]
    pub completed: bool,
}

/// An exercise entry with its exercise and sets resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseDetail {
    #[serde(flatten)]
    pub entry: WorkoutExercise,
    pub exercise: Option<Exercise>,
    pub sets: Vec<WorkoutSet>,
}

/// A workout with its full entry/set tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutWithExercises {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercises: Vec<WorkoutExerciseDetail>,
}

impl WorkoutWithExercises {
    /// All sets across every entry
    pub fn sets(&self) -> impl Iterator<Item = &WorkoutSet> {
        self.exercises.iter().flat_map(|e| e.sets.iter())
    }
}

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCreate {
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub reps: Option<i64>,
    #[serde(default = "yes", with = "completed_flag")]
    pub completed: bool,
}

impl SetCreate {
    pub fn to_set(&self, id: RecordId, workout_exercise_id: RecordId, set_number: i64) -> WorkoutSet {
        WorkoutSet {
            id,
            workout_exercise_id,
            set_number,
            weight: self.weight,
            reps: self.reps,
            completed: self.completed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseCreate {
    pub exercise_id: RecordId,
    #[serde(default)]
    pub sets: Vec<SetCreate>,
}

/// A workout with its nested entries and sets, created in one call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutCreate {
    pub name: String,
    #[serde(deserialize_with = "datetime_input::deserialize")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub exercises: Vec<WorkoutExerciseCreate>,
}

impl WorkoutCreate {
    pub fn to_workout(&self, id: RecordId, created_at: DateTime<Utc>) -> Workout {
        Workout {
            id,
            name: self.name.clone(),
            date: self.date,
            duration: self.duration,
            notes: self.notes.clone(),
            gender: self.gender,
            created_at,
        }
    }
}

impl Validate for WorkoutCreate {
    const SUBJECT: &'static str = "workout";

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::default();
        checker
            .non_empty("name", &self.name)
            .non_negative("duration", self.duration)
            .at_most("duration", self.duration, MAX_DURATION_MINUTES);

        for (i, entry) in self.exercises.iter().enumerate() {
            if entry.exercise_id.as_str().trim().is_empty() {
                checker.push(FieldError::new(
                    format!("exercises[{i}].exerciseId"),
                    "must not be empty",
                ));
            }
            for (j, set) in entry.sets.iter().enumerate() {
                let reps = format!("exercises[{i}].sets[{j}].reps");
                let weight = format!("exercises[{i}].sets[{j}].weight");
                checker
                    .non_negative(&reps, set.reps)
                    .at_most(&reps, set.reps, MAX_REPS)
                    .non_negative_decimal(&weight, set.weight)
                    .fits_decimal(&weight, set.weight, 6, 2);
            }
        }
        checker.finish()
    }
}

/// Partial workout update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_datetime_input::deserialize")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl WorkoutUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.duration.is_none()
            && self.notes.is_none()
            && self.gender.is_none()
    }

    pub fn apply(&self, workout: &mut Workout) {
        if let Some(name) = &self.name {
            workout.name = name.clone();
        }
        if let Some(date) = self.date {
            workout.date = date;
        }
        if let Some(duration) = self.duration {
            workout.duration = Some(duration);
        }
        if let Some(notes) = &self.notes {
            workout.notes = Some(notes.clone());
        }
        if let Some(gender) = self.gender {
            workout.gender = gender;
        }
    }
}

impl Validate for WorkoutUpdate {
    const SUBJECT: &'static str = "workout";

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::default();
        if let Some(name) = &self.name {
            checker.non_empty("name", name);
        }
        checker
            .non_negative("duration", self.duration)
            .at_most("duration", self.duration, MAX_DURATION_MINUTES)
            .finish()
    }
}

// ============================================================================
// Table mapping
// ============================================================================

impl Workout {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecordId::from(row.get::<_, i64>("id")?),
            name: row.get("name")?,
            date: row.get("date")?,
            duration: row.get("duration")?,
            notes: row.get("notes")?,
            gender: sql::variant(row, "gender", Gender::from_str)?,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert the workout row only; entries and sets are inserted separately
    pub fn insert(conn: &Connection, data: &WorkoutCreate, now: DateTime<Utc>) -> DbResult<i64> {
        conn.execute(
            r#"
            INSERT INTO workouts (name, date, duration, notes, gender, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.name,
                data.date,
                data.duration,
                data.notes,
                data.gender.as_str(),
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM workouts WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(workout) => Ok(Some(workout)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Newest first; `limit` of `None` returns everything
    pub fn list(conn: &Connection, limit: Option<i64>) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM workouts ORDER BY date DESC, id DESC LIMIT ?1")?;
        let workouts = stmt
            .query_map([limit.unwrap_or(-1)], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(workouts)
    }

    /// Apply a partial update. Returns `None` if the workout doesn't exist.
    pub fn update(conn: &Connection, id: i64, data: &WorkoutUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(date) = data.date {
            updates.push(format!("date = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(date));
        }
        if let Some(duration) = data.duration {
            updates.push(format!("duration = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(duration));
        }
        if let Some(ref notes) = data.notes {
            updates.push(format!("notes = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(notes.clone()));
        }
        if let Some(gender) = data.gender {
            updates.push(format!("gender = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(gender.as_str()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        let sql = format!(
            "UPDATE workouts SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a workout; entries and sets go with it via ON DELETE CASCADE
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM workouts WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

impl WorkoutExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecordId::from(row.get::<_, i64>("id")?),
            workout_id: RecordId::from(row.get::<_, i64>("workout_id")?),
            exercise_id: RecordId::from(row.get::<_, i64>("exercise_id")?),
            order_index: row.get("order_index")?,
        })
    }

    pub fn insert(
        conn: &Connection,
        workout_id: i64,
        exercise_id: i64,
        order_index: i64,
    ) -> DbResult<i64> {
        conn.execute(
            "INSERT INTO workout_exercises (workout_id, exercise_id, order_index) VALUES (?1, ?2, ?3)",
            params![workout_id, exercise_id, order_index],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_for_workout(conn: &Connection, workout_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM workout_exercises WHERE workout_id = ?1 ORDER BY order_index, id",
        )?;
        let entries = stmt
            .query_map([workout_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

impl WorkoutSet {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecordId::from(row.get::<_, i64>("id")?),
            workout_exercise_id: RecordId::from(row.get::<_, i64>("workout_exercise_id")?),
            set_number: row.get("set_number")?,
            weight: sql::optional_decimal(row, "weight")?,
            reps: row.get("reps")?,
            completed: row.get::<_, i64>("completed")? != 0,
        })
    }

    pub fn insert(
        conn: &Connection,
        workout_exercise_id: i64,
        set_number: i64,
        data: &SetCreate,
    ) -> DbResult<i64> {
        conn.execute(
            r#"
            INSERT INTO sets (workout_exercise_id, set_number, weight, reps, completed)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                workout_exercise_id,
                set_number,
                sql::decimal_text(data.weight),
                data.reps,
                data.completed as i64,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_for_entry(conn: &Connection, workout_exercise_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM sets WHERE workout_exercise_id = ?1 ORDER BY set_number, id",
        )?;
        let sets = stmt
            .query_map([workout_exercise_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sets)
    }
}

impl WorkoutWithExercises {
    /// Load a workout with its entries, exercises and sets
    pub fn load(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let Some(workout) = Workout::get_by_id(conn, id)? else {
            return Ok(None);
        };

        let mut exercises = Vec::new();
        for entry in WorkoutExercise::list_for_workout(conn, id)? {
            let entry_id = entry.id.as_i64().unwrap_or_default();
            let exercise = match entry.exercise_id.as_i64() {
                Some(exercise_id) => Exercise::get_by_id(conn, exercise_id)?,
                None => None,
            };
            let sets = WorkoutSet::list_for_entry(conn, entry_id)?;
            exercises.push(WorkoutExerciseDetail {
                entry,
                exercise,
                sets,
            });
        }

        Ok(Some(Self { workout, exercises }))
    }
}
