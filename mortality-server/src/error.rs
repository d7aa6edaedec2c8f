//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use mortality_core::{InputError, PredictError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Model errors
    ModelUnavailable(String),
    PredictionFailed(String),

    // Validation errors
    ValidationError(String),

    // Resource errors
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ModelUnavailable(reason) => {
                tracing::warn!("Prediction requested without a model: {}", reason);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    format!("Model not loaded: {}", reason),
                )
            }
            AppError::PredictionFailed(msg) => {
                tracing::error!("Prediction failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error making prediction: {}", msg),
                )
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::ModelUnavailable { reason } => AppError::ModelUnavailable(reason),
            other => AppError::PredictionFailed(other.to_string()),
        }
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}
