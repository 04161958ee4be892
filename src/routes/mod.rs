//! HTTP routes
//!
//! One module per area. Each exposes a `*Routes` type whose `routes`
//! function builds a router over the shared [`AppState`]; [`router`] merges
//! them and adds request tracing plus development error detail.

use std::sync::Arc;

use axum::{middleware, Router};
use chrono::{DateTime, NaiveDate};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

use crate::config::ServerConfig;
use crate::errors::{attach_error_detail, AppError, AppResult};
use crate::storage::Storage;

pub mod body;
pub mod exercises;
pub mod health;
pub mod motivation;
pub mod nutrition;
pub mod stats;
pub mod workouts;

pub use body::BodyRoutes;
pub use exercises::ExerciseRoutes;
pub use health::HealthRoutes;
pub use motivation::MotivationRoutes;
pub use nutrition::NutritionRoutes;
pub use stats::StatsRoutes;
pub use workouts::WorkoutRoutes;

/// State shared by every handler
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: ServerConfig) -> Arc<Self> {
        Arc::new(Self {
            storage,
            config: Arc::new(config),
        })
    }
}

/// The complete application router
pub fn router(state: Arc<AppState>) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(
            DefaultMakeSpan::new()
                .level(Level::INFO)
                .include_headers(false),
        )
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    Router::new()
        .merge(HealthRoutes::routes(state.clone()))
        .merge(ExerciseRoutes::routes(state.clone()))
        .merge(WorkoutRoutes::routes(state.clone()))
        .merge(StatsRoutes::routes(state.clone()))
        .merge(NutritionRoutes::routes(state.clone()))
        .merge(BodyRoutes::routes(state.clone()))
        .merge(MotivationRoutes::routes(state.clone()))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            attach_error_detail,
        ))
        .layer(trace)
}

/// A calendar day from `YYYY-MM-DD` or a full RFC 3339 timestamp
pub(crate) fn parse_day(value: &str) -> AppResult<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc().date())
        })
        .ok_or_else(|| AppError::bad_request("Invalid date format"))
}
