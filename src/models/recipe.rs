//! Recipe model
//!
//! Recipes with per-serving macros, ingredient lines and free-form tags.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sql;
use super::validation::{Checker, FieldError, Validate, MAX_COUNT};
use super::RecordId;
use crate::db::DbResult;

/// A recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub instructions: String,
    pub servings: i64,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub calories: Option<i64>,
    pub protein: Option<Decimal>,
    pub carbs: Option<Decimal>,
    pub fat: Option<Decimal>,
    pub ingredients: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub instructions: String,
    #[serde(default = "default_servings")]
    pub servings: i64,
    #[serde(default)]
    pub prep_time: Option<i64>,
    #[serde(default)]
    pub cook_time: Option<i64>,
    #[serde(default)]
    pub calories: Option<i64>,
    #[serde(default)]
    pub protein: Option<Decimal>,
    #[serde(default)]
    pub carbs: Option<Decimal>,
    #[serde(default)]
    pub fat: Option<Decimal>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_servings() -> i64 {
    1
}

impl RecipeCreate {
    pub fn into_recipe(self, id: RecordId, created_at: DateTime<Utc>) -> Recipe {
        Recipe {
            id,
            name: self.name,
            description: self.description,
            instructions: self.instructions,
            servings: self.servings,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            ingredients: self.ingredients,
            tags: self.tags,
            created_at,
        }
    }
}

impl Validate for RecipeCreate {
    const SUBJECT: &'static str = "recipe";

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Checker::default()
            .non_empty("name", &self.name)
            .non_empty("instructions", &self.instructions)
            .positive("servings", Some(self.servings))
            .non_negative("prepTime", self.prep_time)
            .non_negative("cookTime", self.cook_time)
            .non_negative("calories", self.calories)
            .at_most("calories", self.calories, MAX_COUNT)
            .non_negative_decimal("protein", self.protein)
            .non_negative_decimal("carbs", self.carbs)
            .non_negative_decimal("fat", self.fat)
            .fits_decimal("protein", self.protein, 6, 2)
            .fits_decimal("carbs", self.carbs, 6, 2)
            .fits_decimal("fat", self.fat, 6, 2)
            .finish()
    }
}

impl Recipe {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecordId::from(row.get::<_, i64>("id")?),
            name: row.get("name")?,
            description: row.get("description")?,
            instructions: row.get("instructions")?,
            servings: row.get("servings")?,
            prep_time: row.get("prep_time")?,
            cook_time: row.get("cook_time")?,
            calories: row.get("calories")?,
            protein: sql::optional_decimal(row, "protein")?,
            carbs: sql::optional_decimal(row, "carbs")?,
            fat: sql::optional_decimal(row, "fat")?,
            ingredients: sql::json(row, "ingredients")?,
            tags: sql::json(row, "tags")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a new recipe into the database
    pub fn insert(conn: &Connection, data: &RecipeCreate, now: DateTime<Utc>) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO recipes (
                name, description, instructions, servings, prep_time, cook_time,
                calories, protein, carbs, fat, ingredients, tags, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                data.name,
                data.description,
                data.instructions,
                data.servings,
                data.prep_time,
                data.cook_time,
                data.calories,
                sql::decimal_text(data.protein),
                sql::decimal_text(data.carbs),
                sql::decimal_text(data.fat),
                sql::json_text(&data.ingredients),
                sql::json_text(&data.tags),
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes ORDER BY id")?;
        let recipes = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    /// Count recipes
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
        Ok(count)
    }
}
