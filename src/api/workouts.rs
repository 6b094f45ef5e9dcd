use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
    Extension,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};
use uuid::Uuid;

use crate::api::error::{workout_error, ApiFailure, ApiResult};
use crate::api::AppState;
use crate::auth::UserSession;
use crate::models::{
    ExerciseLog, ExerciseLogRecord, FinishSummary, LogUpdate, SelectExerciseRequest, SessionSnapshot,
    WorkoutSession,
};
use crate::services::session_clock::format_elapsed;
use crate::services::WorkoutError;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub plan_id: Option<Uuid>,
}

/// A live session, or a stored one that can no longer change.
#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum SessionView {
    Live(SessionSnapshot),
    History {
        session: WorkoutSession,
        logs: Vec<ExerciseLogRecord>,
    },
}

#[derive(Debug, Serialize)]
struct ClockTick {
    elapsed_seconds: i64,
    elapsed: String,
}

/// Resume the user's in-progress session for the plan, or start one
pub async fn open_session(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(plan_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionSnapshot>), ApiFailure> {
    let (_, shared) = state
        .sessions
        .open(session.user_id, plan_id)
        .await
        .map_err(workout_error)?;

    let snapshot = shared.lock().await.snapshot().map_err(workout_error)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Vec<WorkoutSession>> {
    let sessions = state
        .sessions
        .history(session.user_id, query.plan_id)
        .await
        .map_err(workout_error)?;
    Ok(Json(sessions))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<SessionView> {
    match state.sessions.get(session.user_id, session_id).await {
        Ok(shared) => {
            let snapshot = shared.lock().await.snapshot().map_err(workout_error)?;
            Ok(Json(SessionView::Live(snapshot)))
        }
        Err(WorkoutError::NotActive) => {
            let (stored, logs) = state
                .sessions
                .stored(session.user_id, session_id)
                .await
                .map_err(workout_error)?;
            Ok(Json(SessionView::History { session: stored, logs }))
        }
        Err(e) => Err(workout_error(e)),
    }
}

pub async fn update_log(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path((session_id, exercise_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<LogUpdate>,
) -> ApiResult<ExerciseLog> {
    let shared = state
        .sessions
        .get(session.user_id, session_id)
        .await
        .map_err(workout_error)?;
    let mut controller = shared.lock().await;
    let log = controller.update_log(exercise_id, update).map_err(workout_error)?;
    Ok(Json(log.clone()))
}

pub async fn complete_exercise(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path((session_id, exercise_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<SessionSnapshot> {
    let shared = state
        .sessions
        .get(session.user_id, session_id)
        .await
        .map_err(workout_error)?;
    let mut controller = shared.lock().await;
    controller.complete_exercise(exercise_id).await.map_err(workout_error)?;
    Ok(Json(controller.snapshot().map_err(workout_error)?))
}

pub async fn select_exercise(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectExerciseRequest>,
) -> ApiResult<SessionSnapshot> {
    let shared = state
        .sessions
        .get(session.user_id, session_id)
        .await
        .map_err(workout_error)?;
    let mut controller = shared.lock().await;
    controller.select_exercise(request.index).map_err(workout_error)?;
    Ok(Json(controller.snapshot().map_err(workout_error)?))
}

pub async fn pause_clock(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<SessionSnapshot> {
    let shared = state
        .sessions
        .get(session.user_id, session_id)
        .await
        .map_err(workout_error)?;
    let controller = shared.lock().await;
    controller.pause_clock().map_err(workout_error)?;
    Ok(Json(controller.snapshot().map_err(workout_error)?))
}

pub async fn resume_clock(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<SessionSnapshot> {
    let shared = state
        .sessions
        .get(session.user_id, session_id)
        .await
        .map_err(workout_error)?;
    let controller = shared.lock().await;
    controller.resume_clock().map_err(workout_error)?;
    Ok(Json(controller.snapshot().map_err(workout_error)?))
}

/// Elapsed time of a live session as server-sent `tick` events
pub async fn clock_stream(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(session_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiFailure> {
    let shared = state
        .sessions
        .get(session.user_id, session_id)
        .await
        .map_err(workout_error)?;
    let ticks = shared
        .lock()
        .await
        .subscribe_clock()
        .ok_or_else(|| workout_error(WorkoutError::NotActive))?;

    let stream = WatchStream::new(ticks).map(|elapsed_seconds| {
        let tick = ClockTick {
            elapsed_seconds,
            elapsed: format_elapsed(elapsed_seconds),
        };
        let event = Event::default()
            .event("tick")
            .json_data(&tick)
            .unwrap_or_else(|_| Event::default().event("tick").data(tick.elapsed.clone()));
        Ok(event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

pub async fn summary(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<FinishSummary> {
    let shared = state
        .sessions
        .get(session.user_id, session_id)
        .await
        .map_err(workout_error)?;
    let summary = shared.lock().await.summary();
    Ok(Json(summary))
}

/// Persisted logs of a session, live or not
pub async fn session_logs(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Vec<ExerciseLogRecord>> {
    let (_, logs) = state
        .sessions
        .stored(session.user_id, session_id)
        .await
        .map_err(workout_error)?;
    Ok(Json(logs))
}

pub async fn finish_session(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<WorkoutSession> {
    let shared = state
        .sessions
        .get(session.user_id, session_id)
        .await
        .map_err(workout_error)?;
    let finished = shared.lock().await.finish().await.map_err(workout_error)?;
    state.sessions.remove(session_id).await;
    Ok(Json(finished))
}

pub async fn cancel_session(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<WorkoutSession> {
    let shared = state
        .sessions
        .get(session.user_id, session_id)
        .await
        .map_err(workout_error)?;
    let cancelled = shared.lock().await.cancel().await.map_err(workout_error)?;
    state.sessions.remove(session_id).await;
    Ok(Json(cancelled))
}
