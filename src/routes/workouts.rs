//! Workout routes
//!
//! Listing returns full detail (entries, exercises and sets) for every
//! workout, newest first. Creation writes the whole tree or nothing.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use super::AppState;
use crate::errors::{AppError, ResultExt, ValidJson};
use crate::models::{RecordId, WorkoutCreate, WorkoutUpdate};

/// Number of workouts returned by `/api/workouts/recent`
pub const RECENT_WORKOUTS: usize = 5;

/// Workout routes
pub struct WorkoutRoutes;

impl WorkoutRoutes {
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route(
                "/api/workouts",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/workouts/recent", get(Self::handle_recent))
            .route(
                "/api/workouts/:id",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(state)
    }

    async fn handle_list(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let workouts = state
            .storage
            .get_all_workout_details()
            .await
            .context("Failed to fetch workouts")?;
        Ok((StatusCode::OK, Json(workouts)).into_response())
    }

    async fn handle_recent(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let workouts = state
            .storage
            .get_recent_workouts(RECENT_WORKOUTS)
            .await
            .context("Failed to fetch recent workouts")?;
        Ok((StatusCode::OK, Json(workouts)).into_response())
    }

    async fn handle_get(
        State(state): State<Arc<AppState>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let workout = state
            .storage
            .get_workout_by_id(&RecordId::from(id))
            .await
            .context("Failed to fetch workout")?
            .ok_or_else(|| AppError::not_found("Workout"))?;
        Ok((StatusCode::OK, Json(workout)).into_response())
    }

    async fn handle_create(
        State(state): State<Arc<AppState>>,
        ValidJson(data): ValidJson<WorkoutCreate>,
    ) -> Result<Response, AppError> {
        let workout = state
            .storage
            .create_workout(data)
            .await
            .context("Failed to create workout")?;
        Ok((StatusCode::CREATED, Json(workout)).into_response())
    }

    async fn handle_update(
        State(state): State<Arc<AppState>>,
        Path(id): Path<String>,
        ValidJson(data): ValidJson<WorkoutUpdate>,
    ) -> Result<Response, AppError> {
        let workout = state
            .storage
            .update_workout(&RecordId::from(id), data)
            .await
            .context("Failed to update workout")?
            .ok_or_else(|| AppError::not_found("Workout"))?;
        Ok((StatusCode::OK, Json(workout)).into_response())
    }

    async fn handle_delete(
        State(state): State<Arc<AppState>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let deleted = state
            .storage
            .delete_workout(&RecordId::from(id))
            .await
            .context("Failed to delete workout")?;
        if !deleted {
            return Err(AppError::not_found("Workout"));
        }
        Ok((
            StatusCode::OK,
            Json(json!({ "message": "Workout deleted successfully" })),
        )
            .into_response())
    }
}
