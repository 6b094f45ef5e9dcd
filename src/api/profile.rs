use axum::{extract::State, response::Json, Extension};

use crate::api::error::{not_found, service_error, ApiResult};
use crate::api::AppState;
use crate::auth::UserSession;
use crate::models::{Profile, UpdateProfileRequest};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Profile> {
    state
        .profiles
        .get_profile(session.user_id)
        .await
        .map_err(service_error)?
        .map(Json)
        .ok_or_else(|| not_found("Profile"))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Profile> {
    state
        .profiles
        .update_profile(session.user_id, request)
        .await
        .map_err(service_error)?
        .map(Json)
        .ok_or_else(|| not_found("Profile"))
}
