//! Meal model

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::serde_helpers::datetime_input;
use super::sql;
use super::validation::{Checker, FieldError, Validate, MAX_COUNT};
use super::RecordId;
use crate::db::DbResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// A logged meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub date: DateTime<Utc>,
    pub calories: Option<i64>,
    pub protein: Option<Decimal>,
    pub carbs: Option<Decimal>,
    pub fat: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl Meal {
    /// Whether the meal falls on the given UTC calendar day
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.date.date_naive() == day
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealCreate {
    pub name: String,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    #[serde(deserialize_with = "datetime_input::deserialize")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub calories: Option<i64>,
    #[serde(default)]
    pub protein: Option<Decimal>,
    #[serde(default)]
    pub carbs: Option<Decimal>,
    #[serde(default)]
    pub fat: Option<Decimal>,
}

impl MealCreate {
    pub fn into_meal(self, id: RecordId, created_at: DateTime<Utc>) -> Meal {
        Meal {
            id,
            name: self.name,
            meal_type: self.meal_type,
            date: self.date,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            created_at,
        }
    }
}

impl Validate for MealCreate {
    const SUBJECT: &'static str = "meal";

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Checker::default()
            .non_empty("name", &self.name)
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

impl Meal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecordId::from(row.get::<_, i64>("id")?),
            name: row.get("name")?,
            meal_type: sql::variant(row, "meal_type", MealType::from_str)?,
            date: row.get("date")?,
            calories: row.get("calories")?,
            protein: sql::optional_decimal(row, "protein")?,
            carbs: sql::optional_decimal(row, "carbs")?,
            fat: sql::optional_decimal(row, "fat")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn insert(conn: &Connection, data: &MealCreate, now: DateTime<Utc>) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO meals (name, meal_type, date, calories, protein, carbs, fat, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                data.name,
                data.meal_type.as_str(),
                data.date,
                data.calories,
                sql::decimal_text(data.protein),
                sql::decimal_text(data.carbs),
                sql::decimal_text(data.fat),
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(meal) => Ok(Some(meal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Meals within `[start, end)`, oldest first
    pub fn list_between(
        conn: &Connection,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meals WHERE date >= ?1 AND date < ?2 ORDER BY date, id",
        )?;
        let meals = stmt
            .query_map(params![start, end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meals)
    }

    /// Newest first
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals ORDER BY date DESC, id DESC")?;
        let meals = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_meal_type_uses_type_key() {
        let data: MealCreate = serde_json::from_value(serde_json::json!({
            "name": "Oats",
            "type": "breakfast",
            "date": "2024-06-01T07:30:00Z",
            "calories": 350,
            "protein": "12.5"
        }))
        .unwrap();
        assert_eq!(data.meal_type, MealType::Breakfast);

        let meal = data.into_meal(RecordId::from(1), Utc::now());
        let json = serde_json::to_value(&meal).unwrap();
        assert_eq!(json["type"], "breakfast");
        assert_eq!(json["protein"], "12.5");
        assert!(json["carbs"].is_null());
    }

    #[test]
    fn test_list_between_bounds_by_day() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        for date in ["2024-06-01T00:00:00Z", "2024-06-01T23:59:59Z", "2024-06-02T00:00:00Z"] {
            let data: MealCreate = serde_json::from_value(serde_json::json!({
                "name": "Snack", "type": "snack", "date": date
            }))
            .unwrap();
            Meal::insert(&conn, &data, Utc::now()).unwrap();
        }

        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let start = day.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end = start + chrono::Duration::days(1);
        let meals = Meal::list_between(&conn, start, end).unwrap();
        assert_eq!(meals.len(), 2);
        assert!(meals.iter().all(|m| m.is_on(day)));
    }
}
