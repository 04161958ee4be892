//! Health check route

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::AppState;
use crate::build_info::BuildInfo;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(state)
    }

    async fn handle_health(State(state): State<Arc<AppState>>) -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "storage": {
                "backend": state.storage.backend_name(),
                "connected": state.storage.is_connected().await,
            },
            "build": BuildInfo::current(),
        }))
    }
}
