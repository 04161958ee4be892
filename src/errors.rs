//! HTTP error handling
//!
//! Handlers return [`AppError`], which renders as a JSON body with a
//! `message` field. Validation failures also carry the rejected fields.
//! Internal errors hide their cause unless the server runs in development,
//! where [`attach_error_detail`] adds it as `error`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{async_trait, Json};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::config::ServerConfig;
use crate::models::{FieldError, Validate};
use crate::storage::{StorageError, StorageResult};

/// Error returned by route handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}: {detail}")]
    Internal { message: String, detail: String },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// `"<resource> not found"`
    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(format!("{} not found", resource.into()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn invalid<T: Validate>(errors: Vec<FieldError>) -> Self {
        AppError::Validation {
            message: format!("Invalid {} data", T::SUBJECT),
            errors,
        }
    }

    /// Wrap a storage failure. Dangling references are the caller's fault.
    pub fn storage(message: impl Into<String>, source: StorageError) -> Self {
        if matches!(source, StorageError::InvalidReference { .. }) {
            return AppError::BadRequest(source.to_string());
        }
        AppError::Internal {
            message: message.into(),
            detail: source.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Cause of a 500, kept on the response for [`attach_error_detail`]
#[derive(Debug, Clone)]
pub struct InternalDetail {
    pub message: String,
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Validation { message, errors } => {
                (status, Json(json!({ "message": message, "errors": errors }))).into_response()
            }
            AppError::NotFound(message) | AppError::BadRequest(message) => {
                (status, Json(json!({ "message": message }))).into_response()
            }
            AppError::Internal { message, detail } => {
                error!("{}: {}", message, detail);
                let mut response = (status, Json(json!({ "message": message }))).into_response();
                response
                    .extensions_mut()
                    .insert(InternalDetail { message, detail });
                response
            }
        }
    }
}

/// Attach storage context to a failed call
pub trait ResultExt<T> {
    fn context(self, message: &str) -> AppResult<T>;
}

impl<T> ResultExt<T> for StorageResult<T> {
    fn context(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::storage(message, e))
    }
}

/// Middleware: in development, expose the cause of 500 responses
pub async fn attach_error_detail(
    State(config): State<Arc<ServerConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let detail = response.extensions_mut().remove::<InternalDetail>();

    match detail {
        Some(InternalDetail { message, detail }) if config.environment.is_development() => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": message, "error": detail })),
        )
            .into_response(),
        _ => response,
    }
}

// ============================================================================
// Validated JSON bodies
// ============================================================================

/// JSON body extractor that runs the payload's [`Validate`] checks.
///
/// Malformed JSON and failed checks both become [`AppError::Validation`].
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::invalid::<T>(vec![rejection_error(&rejection)]))?;

        payload.validate().map_err(AppError::invalid::<T>)?;
        Ok(ValidJson(payload))
    }
}

fn rejection_error(rejection: &JsonRejection) -> FieldError {
    FieldError::new("body", rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseCreate, RecordId};
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = AppError::not_found("Workout").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"message": "Workout not found"}));
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let err = AppError::invalid::<ExerciseCreate>(vec![FieldError::new("name", "must not be empty")]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({
                "message": "Invalid exercise data",
                "errors": [{"field": "name", "message": "must not be empty"}]
            })
        );
    }

    #[tokio::test]
    async fn test_internal_hides_detail_but_keeps_it_on_the_response() {
        let err = AppError::storage("Failed to fetch meals", StorageError::NotConnected);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<InternalDetail>().cloned().unwrap();
        assert_eq!(detail.detail, "Storage is not connected");
        assert_eq!(body_json(response).await, json!({"message": "Failed to fetch meals"}));
    }

    #[test]
    fn test_invalid_reference_is_a_bad_request() {
        let err = AppError::storage(
            "Failed to create workout",
            StorageError::InvalidReference {
                entity: "exercise",
                id: RecordId::from(99),
            },
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
