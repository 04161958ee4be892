//! Weight, profile and derived body metric routes

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::AppState;
use crate::errors::{AppError, AppResult, ResultExt, ValidJson};
use crate::metrics::{
    bmi_for, calculate_maintenance_calories, recommended_calories, round_one_decimal,
    BmiCategory, MacroTargets,
};
use crate::models::{
    ActivityLevel, UserProfile, UserProfileUpdate, WeightEntry, WeightEntryCreate, WeightGoal,
};

#[derive(Debug, Serialize)]
struct BmiResponse {
    bmi: f64,
    category: BmiCategory,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CaloriesResponse {
    maintenance_calories: i64,
    recommended_calories: i64,
    weight_goal: WeightGoal,
    activity_level: ActivityLevel,
    macros: MacroTargets,
}

/// Body routes
pub struct BodyRoutes;

impl BodyRoutes {
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route(
                "/api/weight",
                get(Self::handle_list_weight).post(Self::handle_create_weight),
            )
            .route("/api/weight/latest", get(Self::handle_latest_weight))
            .route(
                "/api/profile",
                get(Self::handle_get_profile).post(Self::handle_set_profile),
            )
            .route("/api/bmi", get(Self::handle_bmi))
            .route("/api/maintenance-calories", get(Self::handle_maintenance))
            .with_state(state)
    }

    // ------------------------------------------------------------------
    // Weight
    // ------------------------------------------------------------------

    async fn handle_list_weight(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let entries = state
            .storage
            .get_weight_entries()
            .await
            .context("Failed to fetch weight entries")?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    async fn handle_latest_weight(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let entry = state
            .storage
            .get_latest_weight()
            .await
            .context("Failed to fetch latest weight")?;
        Ok((StatusCode::OK, Json(entry)).into_response())
    }

    async fn handle_create_weight(
        State(state): State<Arc<AppState>>,
        ValidJson(data): ValidJson<WeightEntryCreate>,
    ) -> Result<Response, AppError> {
        let entry = state
            .storage
            .create_weight_entry(data)
            .await
            .context("Failed to create weight entry")?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    async fn handle_get_profile(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let profile = state
            .storage
            .get_user_profile()
            .await
            .context("Failed to fetch profile")?;
        Ok((StatusCode::OK, Json(profile)).into_response())
    }

    async fn handle_set_profile(
        State(state): State<Arc<AppState>>,
        ValidJson(data): ValidJson<UserProfileUpdate>,
    ) -> Result<Response, AppError> {
        let profile = state
            .storage
            .update_user_profile(data)
            .await
            .context("Failed to update profile")?;
        Ok((StatusCode::OK, Json(profile)).into_response())
    }

    // ------------------------------------------------------------------
    // Derived metrics
    // ------------------------------------------------------------------

    /// Profile and latest weight; 404 when either is missing
    async fn profile_and_weight(state: &AppState) -> AppResult<(UserProfile, WeightEntry)> {
        let profile = state
            .storage
            .get_user_profile()
            .await
            .context("Failed to fetch profile")?
            .ok_or_else(|| AppError::not_found("Profile"))?;
        let weight = state
            .storage
            .get_latest_weight()
            .await
            .context("Failed to fetch latest weight")?
            .ok_or_else(|| AppError::not_found("Weight entry"))?;
        Ok((profile, weight))
    }

    async fn handle_bmi(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let (profile, weight) = Self::profile_and_weight(&state).await?;
        let bmi = bmi_for(&profile, &weight)
            .ok_or_else(|| AppError::not_found("Profile height"))?;

        let body = BmiResponse {
            bmi: round_one_decimal(bmi),
            category: BmiCategory::from_bmi(bmi),
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Maintenance from the profile, latest weight and the goal's activity
    /// level; recommended calories shift by the goal's direction
    async fn handle_maintenance(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let (profile, weight) = Self::profile_and_weight(&state).await?;
        let goal = state
            .storage
            .get_nutrition_goals()
            .await
            .context("Failed to fetch nutrition goals")?;

        let activity_level = goal.as_ref().map(|g| g.activity_level).unwrap_or_default();
        let weight_goal = goal.as_ref().map(|g| g.weight_goal).unwrap_or_default();

        let maintenance = calculate_maintenance_calories(&profile, &weight, activity_level)
            .ok_or_else(|| AppError::bad_request("Profile needs age and height"))?;
        let recommended = recommended_calories(maintenance, weight_goal);

        let body = CaloriesResponse {
            maintenance_calories: maintenance,
            recommended_calories: recommended,
            weight_goal,
            activity_level,
            macros: MacroTargets::from_calories(recommended),
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }
}
