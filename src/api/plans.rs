use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::{not_found, service_error, ApiFailure, ApiResult};
use crate::api::AppState;
use crate::auth::UserSession;
use crate::models::{
    CreatePlanRequest, ExercisePlan, PlanDetail, PlanExerciseDetail, PlanExerciseInput, UpdatePlanRequest,
};

#[derive(Debug, Serialize)]
pub struct DeletePlanResponse {
    pub deleted: bool,
    pub plan_id: Uuid,
}

pub async fn list_plans(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Vec<ExercisePlan>> {
    let plans = state.plans.list_plans(session.user_id).await.map_err(service_error)?;
    Ok(Json(plans))
}

pub async fn create_plan(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<PlanDetail>), ApiFailure> {
    let plan = state
        .plans
        .create_plan(session.user_id, request)
        .await
        .map_err(service_error)?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// The user's active plan, if any
pub async fn active_plan(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Option<PlanDetail>> {
    let plan = state.plans.active_plan(session.user_id).await.map_err(service_error)?;
    Ok(Json(plan))
}

pub async fn get_plan(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(plan_id): Path<Uuid>,
) -> ApiResult<PlanDetail> {
    state
        .plans
        .get_plan(session.user_id, plan_id)
        .await
        .map_err(service_error)?
        .map(Json)
        .ok_or_else(|| not_found("Plan"))
}

pub async fn update_plan(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(plan_id): Path<Uuid>,
    Json(request): Json<UpdatePlanRequest>,
) -> ApiResult<ExercisePlan> {
    state
        .plans
        .update_plan(session.user_id, plan_id, request)
        .await
        .map_err(service_error)?
        .map(Json)
        .ok_or_else(|| not_found("Plan"))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(plan_id): Path<Uuid>,
) -> ApiResult<DeletePlanResponse> {
    let deleted = state
        .plans
        .delete_plan(session.user_id, plan_id)
        .await
        .map_err(service_error)?;
    if !deleted {
        return Err(not_found("Plan"));
    }
    state.sessions.remove_plan(session.user_id, plan_id).await;
    Ok(Json(DeletePlanResponse { deleted, plan_id }))
}

pub async fn replace_exercises(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(plan_id): Path<Uuid>,
    Json(exercises): Json<Vec<PlanExerciseInput>>,
) -> ApiResult<Vec<PlanExerciseDetail>> {
    state
        .plans
        .replace_exercises(session.user_id, plan_id, exercises)
        .await
        .map_err(service_error)?
        .map(Json)
        .ok_or_else(|| not_found("Plan"))
}

pub async fn activate_plan(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(plan_id): Path<Uuid>,
) -> ApiResult<ExercisePlan> {
    state
        .plans
        .activate(session.user_id, plan_id)
        .await
        .map_err(service_error)?
        .map(Json)
        .ok_or_else(|| not_found("Plan"))
}

pub async fn deactivate_plan(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(plan_id): Path<Uuid>,
) -> ApiResult<ExercisePlan> {
    state
        .plans
        .deactivate(session.user_id, plan_id)
        .await
        .map_err(service_error)?
        .map(Json)
        .ok_or_else(|| not_found("Plan"))
}
