use axum::{extract::State, http::StatusCode, response::Json, Extension};

use crate::api::AppState;
use crate::auth::{
    AuthError, AuthResponse, AuthService, LoginRequest, MeResponse, MessageResponse, RefreshTokenRequest,
    RegisterRequest, TokenResponse, UserSession,
};

/// Register a new user
#[tracing::instrument(skip(auth_service, request))]
pub async fn register(
    State(auth_service): State<AuthService>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let response = auth_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login user
#[tracing::instrument(skip(auth_service, request))]
pub async fn login(
    State(auth_service): State<AuthService>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = auth_service.login(request).await?;
    Ok(Json(response))
}

/// Refresh access token
#[tracing::instrument(skip(auth_service, request))]
pub async fn refresh_token(
    State(auth_service): State<AuthService>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let response = auth_service.refresh_token(request).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(auth_service, session))]
pub async fn logout(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<MessageResponse>, AuthError> {
    let response = auth_service.logout(&session).await?;
    Ok(Json(response))
}

/// Current user with their profile
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<MeResponse>, AuthError> {
    let user = state.auth_service.me(&session).await?;
    let profile = state.profiles.get_profile(session.user_id).await?;
    Ok(Json(MeResponse { user, profile }))
}
