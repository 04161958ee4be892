//! Daily nutrition totals

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Meal;

/// Sums over one day's meals; missing values count as zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub meals: usize,
    pub calories: i64,
    pub protein: Decimal,
    pub carbs: Decimal,
    pub fat: Decimal,
}

pub fn daily_totals(meals: &[Meal]) -> DailyTotals {
    meals.iter().fold(DailyTotals::default(), |mut totals, meal| {
        totals.meals += 1;
        totals.calories = totals.calories.saturating_add(meal.calories.unwrap_or(0));
        totals.protein = totals.protein.saturating_add(meal.protein.unwrap_or_default());
        totals.carbs = totals.carbs.saturating_add(meal.carbs.unwrap_or_default());
        totals.fat = totals.fat.saturating_add(meal.fat.unwrap_or_default());
        totals
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MealType, RecordId};
    use chrono::Utc;

    fn meal(calories: Option<i64>, protein: Option<&str>) -> Meal {
        Meal {
            id: RecordId::from(1),
            name: "Meal".into(),
            meal_type: MealType::Lunch,
            date: Utc::now(),
            calories,
            protein: protein.map(|p| p.parse().unwrap()),
            carbs: None,
            fat: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_daily_totals() {
        let totals = daily_totals(&[meal(Some(500), Some("30.5")), meal(None, Some("12.25"))]);
        assert_eq!(totals.meals, 2);
        assert_eq!(totals.calories, 500);
        assert_eq!(totals.protein.to_string(), "42.75");
        assert_eq!(totals.fat, Decimal::ZERO);
    }

    #[test]
    fn test_daily_totals_saturate() {
        let totals = daily_totals(&[meal(Some(i64::MAX), None), meal(Some(1), None)]);
        assert_eq!(totals.calories, i64::MAX);
    }
}
