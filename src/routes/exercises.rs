//! Exercise catalogue routes

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use super::AppState;
use crate::errors::{AppError, ResultExt, ValidJson};
use crate::models::{ExerciseCreate, RecordId};

/// Exercise routes
pub struct ExerciseRoutes;

impl ExerciseRoutes {
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route(
                "/api/exercises",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/exercises/:id", get(Self::handle_get))
            .with_state(state)
    }

    async fn handle_list(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let exercises = state
            .storage
            .get_all_exercises()
            .await
            .context("Failed to fetch exercises")?;
        Ok((StatusCode::OK, Json(exercises)).into_response())
    }

    async fn handle_get(
        State(state): State<Arc<AppState>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let exercise = state
            .storage
            .get_exercise_by_id(&RecordId::from(id))
            .await
            .context("Failed to fetch exercise")?
            .ok_or_else(|| AppError::not_found("Exercise"))?;
        Ok((StatusCode::OK, Json(exercise)).into_response())
    }

    async fn handle_create(
        State(state): State<Arc<AppState>>,
        ValidJson(data): ValidJson<ExerciseCreate>,
    ) -> Result<Response, AppError> {
        let exercise = state
            .storage
            .create_exercise(data)
            .await
            .context("Failed to create exercise")?;
        Ok((StatusCode::CREATED, Json(exercise)).into_response())
    }
}
