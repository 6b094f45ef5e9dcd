use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use uuid::Uuid;

use crate::api::error::{not_found, service_error, ApiResult};
use crate::api::AppState;
use crate::models::{Exercise, ExerciseFilter};

/// `GET /api/exercises?muscle_group=&difficulty=&search=`
pub async fn list_exercises(
    State(state): State<AppState>,
    Query(filter): Query<ExerciseFilter>,
) -> ApiResult<Vec<Exercise>> {
    let exercises = state.exercises.list_exercises(&filter).await.map_err(service_error)?;
    Ok(Json(exercises))
}

pub async fn get_exercise(
    State(state): State<AppState>,
    Path(exercise_id): Path<Uuid>,
) -> ApiResult<Exercise> {
    state
        .exercises
        .get_exercise(exercise_id)
        .await
        .map_err(service_error)?
        .map(Json)
        .ok_or_else(|| not_found("Exercise"))
}
