//! Body models
//!
//! Weight log entries and the single user profile.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::serde_helpers::datetime_input;
use super::sql;
use super::validation::{Checker, FieldError, Validate, MAX_AGE};
use super::RecordId;
use crate::db::DbResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Lbs,
    Kg,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Lbs => "lbs",
            WeightUnit::Kg => "kg",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lbs" | "lb" => Some(WeightUnit::Lbs),
            "kg" | "kgs" => Some(WeightUnit::Kg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Inches,
    Cm,
}

impl HeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeightUnit::Inches => "inches",
            HeightUnit::Cm => "cm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inches" | "in" => Some(HeightUnit::Inches),
            "cm" => Some(HeightUnit::Cm),
            _ => None,
        }
    }
}

// ============================================================================
// Weight entries
// ============================================================================

/// A logged body weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    pub id: RecordId,
    pub weight: Decimal,
    pub unit: WeightUnit,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntryCreate {
    pub weight: Decimal,
    #[serde(default)]
    pub unit: WeightUnit,
    #[serde(deserialize_with = "datetime_input::deserialize")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl WeightEntryCreate {
    pub fn into_entry(self, id: RecordId, created_at: DateTime<Utc>) -> WeightEntry {
        WeightEntry {
            id,
            weight: self.weight,
            unit: self.unit,
            date: self.date,
            notes: self.notes,
            created_at,
        }
    }
}

impl Validate for WeightEntryCreate {
    const SUBJECT: &'static str = "weight";

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Checker::default()
            .positive_decimal("weight", Some(self.weight))
            .fits_decimal("weight", Some(self.weight), 5, 2)
            .finish()
    }
}

impl WeightEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecordId::from(row.get::<_, i64>("id")?),
            weight: sql::decimal(row, "weight")?,
            unit: sql::variant(row, "unit", WeightUnit::from_str)?,
            date: row.get("date")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn insert(conn: &Connection, data: &WeightEntryCreate, now: DateTime<Utc>) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO weight_entries (weight, unit, date, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.weight.to_string(),
                data.unit.as_str(),
                data.date,
                data.notes,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM weight_entries WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Newest first
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM weight_entries ORDER BY date DESC, id DESC")?;
        let entries = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn latest(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM weight_entries ORDER BY date DESC, id DESC LIMIT 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// User profile
// ============================================================================

/// The single user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: RecordId,
    pub height: Option<Decimal>,
    pub height_unit: HeightUnit,
    pub age: Option<i64>,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile upsert payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileUpdate {
    #[serde(default)]
    pub height: Option<Decimal>,
    #[serde(default)]
    pub height_unit: HeightUnit,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Gender,
}

impl UserProfileUpdate {
    /// Build the stored profile; `created_at` survives from the previous
    /// version when there is one
    pub fn into_profile(
        self,
        id: RecordId,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> UserProfile {
        UserProfile {
            id,
            height: self.height,
            height_unit: self.height_unit,
            age: self.age,
            gender: self.gender,
            created_at,
            updated_at: now,
        }
    }
}

impl Validate for UserProfileUpdate {
    const SUBJECT: &'static str = "profile";

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Checker::default()
            .positive_decimal("height", self.height)
            .fits_decimal("height", self.height, 5, 2)
            .positive("age", self.age)
            .at_most("age", self.age, MAX_AGE)
            .finish()
    }
}

impl UserProfile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecordId::from(row.get::<_, i64>("id")?),
            height: sql::optional_decimal(row, "height")?,
            height_unit: sql::variant(row, "height_unit", HeightUnit::from_str)?,
            age: row.get("age")?,
            gender: sql::variant(row, "gender", Gender::from_str)?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the profile (single row table)
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM user_profile WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or replace the profile (upsert)
    pub fn set(conn: &Connection, data: &UserProfileUpdate, now: DateTime<Utc>) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO user_profile (id, height, height_unit, age, gender, created_at, updated_at)
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT(id) DO UPDATE SET
                height = excluded.height,
                height_unit = excluded.height_unit,
                age = excluded.age,
                gender = excluded.gender,
                updated_at = excluded.updated_at
            "#,
            params![
                sql::decimal_text(data.height),
                data.height_unit.as_str(),
                data.age,
                data.gender.as_str(),
                now,
            ],
        )?;

        Self::get(conn)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }
}
