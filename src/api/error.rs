use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::services::{ValidationError, WorkoutError};

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error_code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            error_code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }
}

pub type ApiFailure = (StatusCode, Json<ApiError>);
pub type ApiResult<T> = Result<Json<T>, ApiFailure>;

pub fn not_found(what: &str) -> ApiFailure {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new("NOT_FOUND", &format!("{} not found", what))),
    )
}

/// Map a service failure: validation problems become 400, anything else is
/// logged and reported as 500.
pub fn service_error(error: anyhow::Error) -> ApiFailure {
    if let Some(validation) = error.downcast_ref::<ValidationError>() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("VALIDATION_ERROR", &validation.0)),
        );
    }

    tracing::error!("Request failed: {:#}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new("INTERNAL_ERROR", "Internal server error")),
    )
}

pub fn workout_error(error: WorkoutError) -> ApiFailure {
    let (status, code) = match &error {
        WorkoutError::PlanNotFound => (StatusCode::NOT_FOUND, "PLAN_NOT_FOUND"),
        WorkoutError::SessionNotFound => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
        WorkoutError::ExerciseNotInPlan(_) => (StatusCode::NOT_FOUND, "EXERCISE_NOT_IN_PLAN"),
        WorkoutError::AlreadyCompleted(_) => (StatusCode::CONFLICT, "ALREADY_COMPLETED"),
        WorkoutError::NothingCompleted => (StatusCode::CONFLICT, "NOTHING_COMPLETED"),
        WorkoutError::NotActive => (StatusCode::CONFLICT, "SESSION_NOT_ACTIVE"),
        WorkoutError::InvalidIndex(_) => (StatusCode::BAD_REQUEST, "INVALID_INDEX"),
        WorkoutError::InvalidLogValue(_) => (StatusCode::BAD_REQUEST, "INVALID_LOG_VALUE"),
        WorkoutError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
    };

    if let WorkoutError::Store(cause) = &error {
        tracing::error!("Workout request failed: {:#}", cause);
        return (status, Json(ApiError::new(code, "Internal server error")));
    }

    (status, Json(ApiError::new(code, &error.to_string())))
}
