//! Workout statistics routes

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use super::AppState;
use crate::errors::{AppError, ResultExt};
use crate::metrics::workout_streaks;

/// Stats routes
pub struct StatsRoutes;

impl StatsRoutes {
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/api/stats", get(Self::handle_stats))
            .route("/api/stats/streaks", get(Self::handle_streaks))
            .with_state(state)
    }

    async fn handle_stats(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let stats = state
            .storage
            .get_workout_stats()
            .await
            .context("Failed to fetch stats")?;
        Ok((StatusCode::OK, Json(stats)).into_response())
    }

    async fn handle_streaks(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let workouts = state
            .storage
            .get_all_workouts()
            .await
            .context("Failed to fetch streaks")?;
        let streaks = workout_streaks(
            workouts.iter().map(|w| w.date.date_naive()),
            Utc::now().date_naive(),
        );
        Ok((StatusCode::OK, Json(streaks)).into_response())
    }
}
