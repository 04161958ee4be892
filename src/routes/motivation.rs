//! Quotes, daily challenges and achievements

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::AppState;
use crate::errors::{AppError, ResultExt, ValidJson};
use crate::metrics::achievements;
use crate::models::{ChallengeCreate, QuoteCategory};

#[derive(Debug, Default, Deserialize)]
struct QuoteQuery {
    #[serde(default)]
    category: Option<String>,
}

/// Motivation routes
pub struct MotivationRoutes;

impl MotivationRoutes {
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/api/motivation/quote", get(Self::handle_quote))
            .route("/api/motivation/challenge", get(Self::handle_todays_challenge))
            .route(
                "/api/motivation/challenges",
                get(Self::handle_list_challenges).post(Self::handle_create_challenge),
            )
            .route("/api/motivation/achievements", get(Self::handle_achievements))
            .with_state(state)
    }

    /// A random quote, or the first quote of `?category=`. `null` when none match.
    async fn handle_quote(
        State(state): State<Arc<AppState>>,
        Query(query): Query<QuoteQuery>,
    ) -> Result<Response, AppError> {
        let quote = match query.category.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(category) => {
                let category = QuoteCategory::from_str(category)
                    .ok_or_else(|| AppError::bad_request("Invalid quote category"))?;
                state
                    .storage
                    .get_quotes_by_category(category)
                    .await
                    .map(|quotes| quotes.into_iter().next())
            }
            None => state.storage.get_random_quote().await,
        }
        .context("Failed to fetch motivational quote")?;
        Ok((StatusCode::OK, Json(quote)).into_response())
    }

    async fn handle_todays_challenge(
        State(state): State<Arc<AppState>>,
    ) -> Result<Response, AppError> {
        let challenge = state
            .storage
            .get_todays_challenge()
            .await
            .context("Failed to fetch daily challenge")?;
        Ok((StatusCode::OK, Json(challenge)).into_response())
    }

    async fn handle_list_challenges(
        State(state): State<Arc<AppState>>,
    ) -> Result<Response, AppError> {
        let challenges = state
            .storage
            .get_all_challenges()
            .await
            .context("Failed to fetch challenges")?;
        Ok((StatusCode::OK, Json(challenges)).into_response())
    }

    async fn handle_create_challenge(
        State(state): State<Arc<AppState>>,
        ValidJson(data): ValidJson<ChallengeCreate>,
    ) -> Result<Response, AppError> {
        let challenge = state
            .storage
            .create_challenge(data)
            .await
            .context("Failed to create challenge")?;
        Ok((StatusCode::CREATED, Json(challenge)).into_response())
    }

    async fn handle_achievements(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let workouts = state
            .storage
            .get_all_workouts()
            .await
            .context("Failed to fetch achievements")?;
        let stats = state
            .storage
            .get_workout_stats()
            .await
            .context("Failed to fetch achievements")?;

        let badges = achievements(workouts.len() as i64, stats.weekly_workouts);
        Ok((StatusCode::OK, Json(badges)).into_response())
    }
}
