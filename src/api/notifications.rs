use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{not_found, service_error, ApiFailure, ApiResult};
use crate::api::AppState;
use crate::auth::UserSession;
use crate::models::{CreateNotificationRequest, Notification};

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Vec<Notification>> {
    let notifications = state
        .notifications
        .list_notifications(session.user_id, query.unread_only)
        .await
        .map_err(service_error)?;
    Ok(Json(notifications))
}

pub async fn create_notification(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), ApiFailure> {
    let notification = state
        .notifications
        .create_notification(session.user_id, request)
        .await
        .map_err(service_error)?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// Unread notifications scheduled for today
pub async fn pending_today(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Vec<Notification>> {
    let pending = state
        .notifications
        .pending_today(session.user_id)
        .await
        .map_err(service_error)?;
    Ok(Json(pending))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(notification_id): Path<Uuid>,
) -> ApiResult<MarkReadResponse> {
    let found = state
        .notifications
        .mark_read(session.user_id, notification_id)
        .await
        .map_err(service_error)?;
    if !found {
        return Err(not_found("Notification"));
    }
    Ok(Json(MarkReadResponse { updated: 1 }))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<MarkReadResponse> {
    let updated = state
        .notifications
        .mark_all_read(session.user_id)
        .await
        .map_err(service_error)?;
    Ok(Json(MarkReadResponse { updated }))
}
