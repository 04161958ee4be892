//! Nutrition goal model
//!
//! A single goal record; every write replaces it.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sql;
use super::validation::{Checker, FieldError, Validate, MAX_COUNT};
use super::RecordId;
use crate::db::DbResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightGoal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl WeightGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightGoal::Lose => "lose",
            WeightGoal::Maintain => "maintain",
            WeightGoal::Gain => "gain",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lose" => Some(WeightGoal::Lose),
            "maintain" => Some(WeightGoal::Maintain),
            "gain" => Some(WeightGoal::Gain),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "very_active" | "very-active" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Lightly active",
            ActivityLevel::Moderate => "Moderately active",
            ActivityLevel::Active => "Active",
            ActivityLevel::VeryActive => "Very active",
        }
    }
}

/// Daily nutrition targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionGoal {
    pub id: RecordId,
    pub daily_calories: i64,
    pub daily_protein: Decimal,
    pub daily_carbs: Decimal,
    pub daily_fat: Decimal,
    pub maintenance_calories: Option<i64>,
    pub weight_goal: WeightGoal,
    pub activity_level: ActivityLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Goal upsert payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionGoalUpdate {
    pub daily_calories: i64,
    pub daily_protein: Decimal,
    pub daily_carbs: Decimal,
    pub daily_fat: Decimal,
    #[serde(default)]
    pub maintenance_calories: Option<i64>,
    #[serde(default)]
    pub weight_goal: WeightGoal,
    #[serde(default)]
    pub activity_level: ActivityLevel,
}

impl NutritionGoalUpdate {
    pub fn into_goal(
        self,
        id: RecordId,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> NutritionGoal {
        NutritionGoal {
            id,
            daily_calories: self.daily_calories,
            daily_protein: self.daily_protein,
            daily_carbs: self.daily_carbs,
            daily_fat: self.daily_fat,
            maintenance_calories: self.maintenance_calories,
            weight_goal: self.weight_goal,
            activity_level: self.activity_level,
            created_at,
            updated_at: now,
        }
    }
}

impl Validate for NutritionGoalUpdate {
    const SUBJECT: &'static str = "nutrition goals";

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Checker::default()
            .positive("dailyCalories", Some(self.daily_calories))
            .at_most("dailyCalories", Some(self.daily_calories), MAX_COUNT)
            .non_negative_decimal("dailyProtein", Some(self.daily_protein))
            .non_negative_decimal("dailyCarbs", Some(self.daily_carbs))
            .non_negative_decimal("dailyFat", Some(self.daily_fat))
            .fits_decimal("dailyProtein", Some(self.daily_protein), 6, 2)
            .fits_decimal("dailyCarbs", Some(self.daily_carbs), 6, 2)
            .fits_decimal("dailyFat", Some(self.daily_fat), 6, 2)
            .positive("maintenanceCalories", self.maintenance_calories)
            .at_most("maintenanceCalories", self.maintenance_calories, MAX_COUNT)
            .finish()
    }
}

impl NutritionGoal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: RecordId::from(row.get::<_, i64>("id")?),
            daily_calories: row.get("daily_calories")?,
            daily_protein: sql::decimal(row, "daily_protein")?,
            daily_carbs: sql::decimal(row, "daily_carbs")?,
            daily_fat: sql::decimal(row, "daily_fat")?,
            maintenance_calories: row.get("maintenance_calories")?,
            weight_goal: sql::variant(row, "weight_goal", WeightGoal::from_str)?,
            activity_level: sql::variant(row, "activity_level", ActivityLevel::from_str)?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the goal (single row table)
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM nutrition_goals WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(goal) => Ok(Some(goal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or replace the goal (upsert)
    pub fn set(conn: &Connection, data: &NutritionGoalUpdate, now: DateTime<Utc>) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO nutrition_goals (
                id, daily_calories, daily_protein, daily_carbs, daily_fat,
                maintenance_calories, weight_goal, activity_level, created_at, updated_at
            )
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            ON CONFLICT(id) DO UPDATE SET
                daily_calories = excluded.daily_calories,
                daily_protein = excluded.daily_protein,
                daily_carbs = excluded.daily_carbs,
                daily_fat = excluded.daily_fat,
                maintenance_calories = excluded.maintenance_calories,
                weight_goal = excluded.weight_goal,
                activity_level = excluded.activity_level,
                updated_at = excluded.updated_at
            "#,
            params![
                data.daily_calories,
                data.daily_protein.to_string(),
                data.daily_carbs.to_string(),
                data.daily_fat.to_string(),
                data.maintenance_calories,
                data.weight_goal.as_str(),
                data.activity_level.as_str(),
                now,
            ],
        )?;

        Self::get(conn)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_defaults() {
        let data: NutritionGoalUpdate = serde_json::from_value(serde_json::json!({
            "dailyCalories": 2200,
            "dailyProtein": "150",
            "dailyCarbs": 250,
            "dailyFat": "70.5"
        }))
        .unwrap();
        assert_eq!(data.weight_goal, WeightGoal::Maintain);
        assert_eq!(data.activity_level, ActivityLevel::Moderate);
        assert_eq!(data.daily_fat.to_string(), "70.5");
    }

    #[test]
    fn test_activity_level_wire_name() {
        let level: ActivityLevel = serde_json::from_str("\"very_active\"").unwrap();
        assert_eq!(level, ActivityLevel::VeryActive);
        assert_eq!(ActivityLevel::from_str(level.as_str()), Some(level));
    }

    #[test]
    fn test_validation_rejects_zero_calories() {
        let data = NutritionGoalUpdate {
            daily_calories: 0,
            daily_protein: Decimal::ZERO,
            daily_carbs: Decimal::ZERO,
            daily_fat: Decimal::ZERO,
            maintenance_calories: None,
            weight_goal: WeightGoal::Lose,
            activity_level: ActivityLevel::Light,
        };
        let errors = data.validate().unwrap_err();
        assert_eq!(errors[0].field, "dailyCalories");
    }
}
