use axum::{
    extract::FromRef,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use super::health::health_check;
use super::{auth, exercises, notifications, plans, profile, reminders, workouts};
use crate::auth::{cors_layer, jwt_auth_middleware, security_headers_layer, AuthService};
use crate::services::{
    ExerciseService, NotificationService, PlanService, ProfileService, ReminderHub, SessionRegistry,
};
use crate::store::{DynAuthStore, DynFitnessStore};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub plans: PlanService,
    pub exercises: ExerciseService,
    pub notifications: NotificationService,
    pub profiles: ProfileService,
    pub sessions: SessionRegistry,
    pub reminders: ReminderHub,
}

impl AppState {
    pub fn new(
        fitness_store: DynFitnessStore,
        auth_store: DynAuthStore,
        jwt_secret: &str,
        reminder_period: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            auth_service: AuthService::new(auth_store, jwt_secret),
            plans: PlanService::new(fitness_store.clone()),
            exercises: ExerciseService::new(fitness_store.clone()),
            notifications: NotificationService::new(fitness_store.clone()),
            profiles: ProfileService::new(fitness_store.clone()),
            sessions: SessionRegistry::new(fitness_store.clone()),
            reminders: ReminderHub::new(fitness_store, reminder_period, shutdown),
        }
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}

pub fn create_routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/exercises", get(exercises::list_exercises))
        .route("/exercises/:exercise_id", get(exercises::get_exercise))
        .route("/plans", get(plans::list_plans).post(plans::create_plan))
        .route("/plans/active", get(plans::active_plan))
        .route(
            "/plans/:plan_id",
            get(plans::get_plan).put(plans::update_plan).delete(plans::delete_plan),
        )
        .route("/plans/:plan_id/exercises", put(plans::replace_exercises))
        .route("/plans/:plan_id/activate", post(plans::activate_plan))
        .route("/plans/:plan_id/deactivate", post(plans::deactivate_plan))
        .route("/plans/:plan_id/sessions", post(workouts::open_session))
        .route("/workouts/sessions", get(workouts::list_sessions))
        .route("/workouts/sessions/:session_id", get(workouts::get_session))
        .route(
            "/workouts/sessions/:session_id/exercises/:exercise_id",
            patch(workouts::update_log),
        )
        .route(
            "/workouts/sessions/:session_id/exercises/:exercise_id/complete",
            post(workouts::complete_exercise),
        )
        .route("/workouts/sessions/:session_id/current", put(workouts::select_exercise))
        .route("/workouts/sessions/:session_id/clock", get(workouts::clock_stream))
        .route("/workouts/sessions/:session_id/clock/pause", post(workouts::pause_clock))
        .route("/workouts/sessions/:session_id/clock/resume", post(workouts::resume_clock))
        .route("/workouts/sessions/:session_id/summary", get(workouts::summary))
        .route("/workouts/sessions/:session_id/logs", get(workouts::session_logs))
        .route("/workouts/sessions/:session_id/finish", post(workouts::finish_session))
        .route("/workouts/sessions/:session_id/cancel", post(workouts::cancel_session))
        .route(
            "/notifications",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route("/notifications/today", get(notifications::pending_today))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/:notification_id/read", post(notifications::mark_read))
        .route("/reminders/stream", get(reminders::reminder_stream))
        .route_layer(middleware::from_fn_with_state(
            state.auth_service.clone(),
            jwt_auth_middleware,
        ));

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .layer(security_headers_layer())
        .layer(cors_layer())
        .with_state(state)
}
