//! Meal, recipe and nutrition goal routes

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::{parse_day, AppState};
use crate::errors::{AppError, ResultExt, ValidJson};
use crate::metrics::daily_totals;
use crate::models::{MealCreate, NutritionGoalUpdate, RecipeCreate};

#[derive(Debug, Default, Deserialize)]
struct MealQuery {
    #[serde(default)]
    date: Option<String>,
}

/// Nutrition routes
pub struct NutritionRoutes;

impl NutritionRoutes {
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route(
                "/api/meals",
                get(Self::handle_list_meals).post(Self::handle_create_meal),
            )
            .route("/api/meals/:date", get(Self::handle_meals_for_day))
            .route("/api/meals/:date/totals", get(Self::handle_totals_for_day))
            .route(
                "/api/recipes",
                get(Self::handle_list_recipes).post(Self::handle_create_recipe),
            )
            .route(
                "/api/nutrition-goals",
                get(Self::handle_get_goals).post(Self::handle_set_goals),
            )
            .with_state(state)
    }

    // ------------------------------------------------------------------
    // Meals
    // ------------------------------------------------------------------

    /// All meals newest first, or one day's meals with `?date=`
    async fn handle_list_meals(
        State(state): State<Arc<AppState>>,
        Query(query): Query<MealQuery>,
    ) -> Result<Response, AppError> {
        let meals = match query.date.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(date) => state.storage.get_meals_by_date(parse_day(date)?).await,
            None => state.storage.get_all_meals().await,
        }
        .context("Failed to fetch meals")?;
        Ok((StatusCode::OK, Json(meals)).into_response())
    }

    /// One UTC day's meals, oldest first
    async fn handle_meals_for_day(
        State(state): State<Arc<AppState>>,
        Path(date): Path<String>,
    ) -> Result<Response, AppError> {
        let meals = state
            .storage
            .get_meals_by_date(parse_day(&date)?)
            .await
            .context("Failed to fetch meals")?;
        Ok((StatusCode::OK, Json(meals)).into_response())
    }

    async fn handle_totals_for_day(
        State(state): State<Arc<AppState>>,
        Path(date): Path<String>,
    ) -> Result<Response, AppError> {
        let day = parse_day(&date)?;
        let meals = state
            .storage
            .get_meals_by_date(day)
            .await
            .context("Failed to fetch meals")?;
        let totals = daily_totals(&meals);
        Ok((
            StatusCode::OK,
            Json(json!({ "date": day, "totals": totals })),
        )
            .into_response())
    }

    async fn handle_create_meal(
        State(state): State<Arc<AppState>>,
        ValidJson(data): ValidJson<MealCreate>,
    ) -> Result<Response, AppError> {
        let meal = state
            .storage
            .create_meal(data)
            .await
            .context("Failed to create meal")?;
        Ok((StatusCode::CREATED, Json(meal)).into_response())
    }

    // ------------------------------------------------------------------
    // Recipes
    // ------------------------------------------------------------------

    async fn handle_list_recipes(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let recipes = state
            .storage
            .get_all_recipes()
            .await
            .context("Failed to fetch recipes")?;
        Ok((StatusCode::OK, Json(recipes)).into_response())
    }

    async fn handle_create_recipe(
        State(state): State<Arc<AppState>>,
        ValidJson(data): ValidJson<RecipeCreate>,
    ) -> Result<Response, AppError> {
        let recipe = state
            .storage
            .create_recipe(data)
            .await
            .context("Failed to create recipe")?;
        Ok((StatusCode::CREATED, Json(recipe)).into_response())
    }

    // ------------------------------------------------------------------
    // Goals
    // ------------------------------------------------------------------

    /// The goal record, or `null` before one is set
    async fn handle_get_goals(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let goal = state
            .storage
            .get_nutrition_goals()
            .await
            .context("Failed to fetch nutrition goals")?;
        Ok((StatusCode::OK, Json(goal)).into_response())
    }

    async fn handle_set_goals(
        State(state): State<Arc<AppState>>,
        ValidJson(data): ValidJson<NutritionGoalUpdate>,
    ) -> Result<Response, AppError> {
        let goal = state
            .storage
            .update_nutrition_goals(data)
            .await
            .context("Failed to update nutrition goals")?;
        Ok((StatusCode::CREATED, Json(goal)).into_response())
    }
}
