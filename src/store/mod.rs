//! Typed access to the persisted tables.
//!
//! Everything the services need from the database goes through these two
//! traits. Rows are decoded into the records in [`crate::models`] here, so
//! nothing above this layer handles untyped data. Operations that touch more
//! than one row run as a single transaction in the implementation.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    CreateNotificationRequest, CreatePlanRequest, Exercise, ExerciseFilter, ExerciseLogRecord,
    ExercisePlan, NewExerciseLog, NewProfile, Notification, PlanExercise, PlanExerciseDetail,
    PlanExerciseInput, Profile, UpdatePlanRequest, UpdateProfileRequest, WorkoutSession,
};

pub use postgres::PgStore;

/// Stored user credentials.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Insert the user and its profile row together.
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        profile: &NewProfile,
    ) -> anyhow::Result<UserRecord>;

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>>;

    async fn find_user_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<UserRecord>>;

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    async fn is_refresh_token_valid(&self, user_id: Uuid, token_hash: &str) -> anyhow::Result<bool>;

    async fn revoke_refresh_tokens(&self, user_id: Uuid) -> anyhow::Result<()>;

    async fn blacklist_token(&self, jti: &str, expires_at: DateTime<Utc>) -> anyhow::Result<()>;

    async fn is_token_blacklisted(&self, jti: &str) -> anyhow::Result<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FitnessStore: Send + Sync {
    // profiles
    async fn get_profile(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &UpdateProfileRequest,
    ) -> anyhow::Result<Option<Profile>>;

    // exercises
    async fn list_exercises(&self, filter: &ExerciseFilter) -> anyhow::Result<Vec<Exercise>>;

    async fn get_exercise(&self, exercise_id: Uuid) -> anyhow::Result<Option<Exercise>>;

    /// Ids from `exercise_ids` that are not in the catalog.
    async fn missing_exercises(&self, exercise_ids: &[Uuid]) -> anyhow::Result<Vec<Uuid>>;

    // exercise_plans / plan_exercises
    async fn create_plan(
        &self,
        user_id: Uuid,
        request: &CreatePlanRequest,
    ) -> anyhow::Result<ExercisePlan>;

    async fn list_plans(&self, user_id: Uuid) -> anyhow::Result<Vec<ExercisePlan>>;

    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> anyhow::Result<Option<ExercisePlan>>;

    async fn update_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        update: &UpdatePlanRequest,
    ) -> anyhow::Result<Option<ExercisePlan>>;

    async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> anyhow::Result<bool>;

    /// Replace the plan's exercise list; order follows the slice.
    async fn replace_plan_exercises(
        &self,
        plan_id: Uuid,
        exercises: &[PlanExerciseInput],
    ) -> anyhow::Result<Vec<PlanExercise>>;

    /// Exercises of a plan ordered by `order_in_plan`.
    async fn list_plan_exercises(&self, plan_id: Uuid) -> anyhow::Result<Vec<PlanExerciseDetail>>;

    /// Deactivate every other plan of the user and activate this one, atomically.
    async fn activate_plan(&self, user_id: Uuid, plan_id: Uuid) -> anyhow::Result<Option<ExercisePlan>>;

    async fn deactivate_plan(&self, user_id: Uuid, plan_id: Uuid) -> anyhow::Result<Option<ExercisePlan>>;

    async fn list_active_plans(&self, user_id: Uuid) -> anyhow::Result<Vec<ExercisePlan>>;

    // workout_sessions / user_exercise_logs
    /// Most recently started `in_progress` session for the pair.
    async fn find_in_progress_session(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> anyhow::Result<Option<WorkoutSession>>;

    /// New `in_progress` session numbered after the pair's last one.
    async fn create_session(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        total_exercises: i32,
    ) -> anyhow::Result<WorkoutSession>;

    async fn get_session(&self, user_id: Uuid, session_id: Uuid) -> anyhow::Result<Option<WorkoutSession>>;

    async fn list_sessions(
        &self,
        user_id: Uuid,
        plan_id: Option<Uuid>,
    ) -> anyhow::Result<Vec<WorkoutSession>>;

    /// Insert the log row and bump the session's completed count.
    async fn insert_exercise_log(&self, log: &NewExerciseLog) -> anyhow::Result<ExerciseLogRecord>;

    async fn list_session_logs(&self, session_id: Uuid) -> anyhow::Result<Vec<ExerciseLogRecord>>;

    /// Mark the session completed and add one to the plan's completed sessions.
    async fn complete_session(
        &self,
        session_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> anyhow::Result<WorkoutSession>;

    async fn cancel_session(
        &self,
        session_id: Uuid,
        cancelled_at: DateTime<Utc>,
    ) -> anyhow::Result<WorkoutSession>;

    // notifications
    async fn create_notification(
        &self,
        user_id: Uuid,
        request: &CreateNotificationRequest,
    ) -> anyhow::Result<Notification>;

    async fn list_notifications(&self, user_id: Uuid, unread_only: bool) -> anyhow::Result<Vec<Notification>>;

    /// Unread notifications scheduled in `[from, to]`.
    async fn list_unread_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Notification>>;

    async fn mark_notification_read(&self, user_id: Uuid, notification_id: Uuid) -> anyhow::Result<bool>;

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> anyhow::Result<u64>;
}

pub type DynFitnessStore = Arc<dyn FitnessStore>;
pub type DynAuthStore = Arc<dyn AuthStore>;
