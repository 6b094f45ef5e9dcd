use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{AuthStore, FitnessStore, UserRecord};
use crate::models::{
    CreateNotificationRequest, CreatePlanRequest, Difficulty, Exercise, ExerciseFilter,
    ExerciseLogRecord, ExercisePlan, NewExerciseLog, NewProfile, Notification, PlanExercise,
    PlanExerciseDetail, PlanExerciseInput, Profile, SessionStatus, UpdatePlanRequest,
    UpdateProfileRequest, WorkoutSession,
};

const PLAN_COLUMNS: &str = "id, user_id, plan_name, description, goal, difficulty, start_date, end_date, \
    is_active, completed_sessions, total_sessions, estimated_calories, notification_time, created_at, updated_at";

const SESSION_COLUMNS: &str = "id, user_id, plan_id, session_number, status, total_exercises, \
    completed_exercises, date_started, date_completed";

const EXERCISE_COLUMNS: &str =
    "id, name, description, muscle_group, difficulty, instructions, equipment, calories";

const LOG_COLUMNS: &str = "id, user_id, exercise_id, plan_id, session_id, sets_completed, reps_completed, \
    duration_minutes, weight_kg, notes, completed_at";

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, scheduled_at, is_read, created_at";

const PROFILE_COLUMNS: &str =
    "id, full_name, age, weight_kg, height_cm, goal, avatar_url, created_at, updated_at";

/// Flat row of `plan_exercises` joined with `exercises`.
#[derive(Debug, sqlx::FromRow)]
struct PlanExerciseRow {
    id: Uuid,
    plan_id: Uuid,
    exercise_id: Uuid,
    order_in_plan: i32,
    sets: Option<i32>,
    reps: Option<i32>,
    duration_minutes: Option<i32>,
    distance_km: Option<f64>,
    weight_kg: Option<f64>,
    exercise_name: String,
    exercise_description: Option<String>,
    exercise_muscle_group: Option<String>,
    exercise_difficulty: Option<Difficulty>,
    exercise_instructions: Option<String>,
    exercise_equipment: Option<String>,
    exercise_calories: Option<i32>,
}

impl From<PlanExerciseRow> for PlanExerciseDetail {
    fn from(row: PlanExerciseRow) -> Self {
        PlanExerciseDetail {
            plan_exercise: PlanExercise {
                id: row.id,
                plan_id: row.plan_id,
                exercise_id: row.exercise_id,
                order_in_plan: row.order_in_plan,
                sets: row.sets,
                reps: row.reps,
                duration_minutes: row.duration_minutes,
                distance_km: row.distance_km,
                weight_kg: row.weight_kg,
            },
            exercise: Exercise {
                id: row.exercise_id,
                name: row.exercise_name,
                description: row.exercise_description,
                muscle_group: row.exercise_muscle_group,
                difficulty: row.exercise_difficulty,
                instructions: row.exercise_instructions,
                equipment: row.exercise_equipment,
                calories: row.exercise_calories,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn insert_plan_exercises(
        tx: &mut Transaction<'_, Postgres>,
        plan_id: Uuid,
        exercises: &[PlanExerciseInput],
    ) -> Result<Vec<PlanExercise>> {
        let mut inserted = Vec::with_capacity(exercises.len());

        for (index, exercise) in exercises.iter().enumerate() {
            let row = sqlx::query_as::<_, PlanExercise>(
                "INSERT INTO plan_exercises
                    (id, plan_id, exercise_id, order_in_plan, sets, reps, duration_minutes, distance_km, weight_kg)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 RETURNING id, plan_id, exercise_id, order_in_plan, sets, reps, duration_minutes, distance_km, weight_kg",
            )
            .bind(Uuid::new_v4())
            .bind(plan_id)
            .bind(exercise.exercise_id)
            .bind(index as i32 + 1)
            .bind(exercise.sets)
            .bind(exercise.reps)
            .bind(exercise.duration_minutes)
            .bind(exercise.distance_km)
            .bind(exercise.weight_kg)
            .fetch_one(&mut **tx)
            .await?;

            inserted.push(row);
        }

        Ok(inserted)
    }
}

#[async_trait]
impl AuthStore for PgStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        profile: &NewProfile,
    ) -> Result<UserRecord> {
        let mut tx = self.db.begin().await?;
        let now = Utc::now();

        let user = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, password_hash, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING id, email, password_hash, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO profiles (id, full_name, age, weight_kg, height_cm, goal, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
        )
        .bind(user.id)
        .bind(&profile.full_name)
        .bind(profile.age)
        .bind(profile.weight_kg)
        .bind(profile.height_cm)
        .bind(&profile.goal)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn is_refresh_token_valid(&self, user_id: Uuid, token_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            "SELECT 1 FROM refresh_tokens
             WHERE user_id = $1 AND token_hash = $2 AND expires_at > NOW() AND NOT revoked",
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(&self.db)
        .await?;

        Ok(result.is_some())
    }

    async fn revoke_refresh_tokens(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE refresh_tokens SET revoked = true WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn blacklist_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "INSERT INTO token_blacklist (jti, expires_at) VALUES ($1, $2)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn is_token_blacklisted(&self, jti: &str) -> Result<bool> {
        let result = sqlx::query("SELECT 1 FROM token_blacklist WHERE jti = $1 AND expires_at > NOW()")
            .bind(jti)
            .fetch_optional(&self.db)
            .await?;

        Ok(result.is_some())
    }
}

#[async_trait]
impl FitnessStore for PgStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "UPDATE profiles
             SET full_name = COALESCE($2, full_name),
                 age = COALESCE($3, age),
                 weight_kg = COALESCE($4, weight_kg),
                 height_cm = COALESCE($5, height_cm),
                 goal = COALESCE($6, goal),
                 avatar_url = COALESCE($7, avatar_url),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(&update.full_name)
        .bind(update.age)
        .bind(update.weight_kg)
        .bind(update.height_cm)
        .bind(&update.goal)
        .bind(&update.avatar_url)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    async fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>> {
        let mut sql = format!("SELECT {} FROM exercises WHERE TRUE", EXERCISE_COLUMNS);
        let mut param_count = 1;

        if filter.muscle_group.is_some() {
            sql.push_str(&format!(" AND LOWER(muscle_group) = LOWER(${})", param_count));
            param_count += 1;
        }

        if filter.difficulty.is_some() {
            sql.push_str(&format!(" AND difficulty = ${}", param_count));
            param_count += 1;
        }

        if filter.search.is_some() {
            sql.push_str(&format!(
                " AND (name ILIKE ${0} OR description ILIKE ${0})",
                param_count
            ));
        }

        sql.push_str(" ORDER BY name ASC");

        let mut query = sqlx::query_as::<_, Exercise>(&sql);
        if let Some(group) = &filter.muscle_group {
            query = query.bind(group);
        }
        if let Some(difficulty) = filter.difficulty {
            query = query.bind(difficulty);
        }
        if let Some(search) = &filter.search {
            query = query.bind(format!("%{}%", search));
        }

        let exercises = query.fetch_all(&self.db).await?;
        Ok(exercises)
    }

    async fn get_exercise(&self, exercise_id: Uuid) -> Result<Option<Exercise>> {
        let exercise = sqlx::query_as::<_, Exercise>(&format!(
            "SELECT {} FROM exercises WHERE id = $1",
            EXERCISE_COLUMNS
        ))
        .bind(exercise_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(exercise)
    }

    async fn missing_exercises(&self, exercise_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let found: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM exercises WHERE id = ANY($1)")
            .bind(exercise_ids)
            .fetch_all(&self.db)
            .await?;

        Ok(exercise_ids
            .iter()
            .filter(|id| !found.contains(id))
            .copied()
            .collect())
    }

    async fn create_plan(&self, user_id: Uuid, request: &CreatePlanRequest) -> Result<ExercisePlan> {
        let mut tx = self.db.begin().await?;
        let now = Utc::now();

        let plan = sqlx::query_as::<_, ExercisePlan>(&format!(
            "INSERT INTO exercise_plans
                (id, user_id, plan_name, description, goal, difficulty, start_date, end_date,
                 total_sessions, estimated_calories, notification_time, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
             RETURNING {}",
            PLAN_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&request.plan_name)
        .bind(&request.description)
        .bind(&request.goal)
        .bind(request.difficulty)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.total_sessions)
        .bind(request.estimated_calories)
        .bind(request.notification_time)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_plan_exercises(&mut tx, plan.id, &request.exercises).await?;

        tx.commit().await?;
        Ok(plan)
    }

    async fn list_plans(&self, user_id: Uuid) -> Result<Vec<ExercisePlan>> {
        let plans = sqlx::query_as::<_, ExercisePlan>(&format!(
            "SELECT {} FROM exercise_plans WHERE user_id = $1 ORDER BY is_active DESC, created_at DESC",
            PLAN_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(plans)
    }

    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<ExercisePlan>> {
        let plan = sqlx::query_as::<_, ExercisePlan>(&format!(
            "SELECT {} FROM exercise_plans WHERE id = $1 AND user_id = $2",
            PLAN_COLUMNS
        ))
        .bind(plan_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(plan)
    }

    async fn update_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        update: &UpdatePlanRequest,
    ) -> Result<Option<ExercisePlan>> {
        let plan = sqlx::query_as::<_, ExercisePlan>(&format!(
            "UPDATE exercise_plans
             SET plan_name = COALESCE($3, plan_name),
                 description = COALESCE($4, description),
                 goal = COALESCE($5, goal),
                 difficulty = COALESCE($6, difficulty),
                 start_date = COALESCE($7, start_date),
                 end_date = COALESCE($8, end_date),
                 total_sessions = COALESCE($9, total_sessions),
                 estimated_calories = COALESCE($10, estimated_calories),
                 notification_time = COALESCE($11, notification_time),
                 updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            PLAN_COLUMNS
        ))
        .bind(plan_id)
        .bind(user_id)
        .bind(&update.plan_name)
        .bind(&update.description)
        .bind(&update.goal)
        .bind(update.difficulty)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(update.total_sessions)
        .bind(update.estimated_calories)
        .bind(update.notification_time)
        .fetch_optional(&self.db)
        .await?;

        Ok(plan)
    }

    async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM exercise_plans WHERE id = $1 AND user_id = $2")
            .bind(plan_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_plan_exercises(
        &self,
        plan_id: Uuid,
        exercises: &[PlanExerciseInput],
    ) -> Result<Vec<PlanExercise>> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM plan_exercises WHERE plan_id = $1")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?;

        let inserted = Self::insert_plan_exercises(&mut tx, plan_id, exercises).await?;

        sqlx::query("UPDATE exercise_plans SET updated_at = NOW() WHERE id = $1")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(inserted)
    }

    async fn list_plan_exercises(&self, plan_id: Uuid) -> Result<Vec<PlanExerciseDetail>> {
        let rows = sqlx::query_as::<_, PlanExerciseRow>(
            "SELECT pe.id, pe.plan_id, pe.exercise_id, pe.order_in_plan, pe.sets, pe.reps,
                    pe.duration_minutes, pe.distance_km, pe.weight_kg,
                    e.name AS exercise_name,
                    e.description AS exercise_description,
                    e.muscle_group AS exercise_muscle_group,
                    e.difficulty AS exercise_difficulty,
                    e.instructions AS exercise_instructions,
                    e.equipment AS exercise_equipment,
                    e.calories AS exercise_calories
             FROM plan_exercises pe
             JOIN exercises e ON e.id = pe.exercise_id
             WHERE pe.plan_id = $1
             ORDER BY pe.order_in_plan ASC",
        )
        .bind(plan_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PlanExerciseDetail::from).collect())
    }

    async fn activate_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<ExercisePlan>> {
        let mut tx = self.db.begin().await?;

        let owned = sqlx::query("SELECT 1 FROM exercise_plans WHERE id = $1 AND user_id = $2 FOR UPDATE")
            .bind(plan_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        if owned.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query(
            "UPDATE exercise_plans SET is_active = FALSE, updated_at = NOW()
             WHERE user_id = $1 AND is_active AND id <> $2",
        )
        .bind(user_id)
        .bind(plan_id)
        .execute(&mut *tx)
        .await?;

        let plan = sqlx::query_as::<_, ExercisePlan>(&format!(
            "UPDATE exercise_plans SET is_active = TRUE, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            PLAN_COLUMNS
        ))
        .bind(plan_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(plan))
    }

    async fn deactivate_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<ExercisePlan>> {
        let plan = sqlx::query_as::<_, ExercisePlan>(&format!(
            "UPDATE exercise_plans SET is_active = FALSE, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            PLAN_COLUMNS
        ))
        .bind(plan_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(plan)
    }

    async fn list_active_plans(&self, user_id: Uuid) -> Result<Vec<ExercisePlan>> {
        let plans = sqlx::query_as::<_, ExercisePlan>(&format!(
            "SELECT {} FROM exercise_plans WHERE user_id = $1 AND is_active",
            PLAN_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(plans)
    }

    async fn find_in_progress_session(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> Result<Option<WorkoutSession>> {
        let session = sqlx::query_as::<_, WorkoutSession>(&format!(
            "SELECT {} FROM workout_sessions
             WHERE user_id = $1 AND plan_id = $2 AND status = $3
             ORDER BY date_started DESC
             LIMIT 1",
            SESSION_COLUMNS
        ))
        .bind(user_id)
        .bind(plan_id)
        .bind(SessionStatus::InProgress)
        .fetch_optional(&self.db)
        .await?;

        Ok(session)
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        total_exercises: i32,
    ) -> Result<WorkoutSession> {
        let session = sqlx::query_as::<_, WorkoutSession>(&format!(
            "INSERT INTO workout_sessions
                (id, user_id, plan_id, session_number, status, total_exercises, completed_exercises, date_started)
             SELECT $1, $2, $3, COALESCE(MAX(session_number), 0) + 1, $4, $5, 0, $6
             FROM workout_sessions
             WHERE user_id = $2 AND plan_id = $3
             RETURNING {}",
            SESSION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(plan_id)
        .bind(SessionStatus::InProgress)
        .bind(total_exercises)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(session)
    }

    async fn get_session(&self, user_id: Uuid, session_id: Uuid) -> Result<Option<WorkoutSession>> {
        let session = sqlx::query_as::<_, WorkoutSession>(&format!(
            "SELECT {} FROM workout_sessions WHERE id = $1 AND user_id = $2",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(session)
    }

    async fn list_sessions(&self, user_id: Uuid, plan_id: Option<Uuid>) -> Result<Vec<WorkoutSession>> {
        let sessions = sqlx::query_as::<_, WorkoutSession>(&format!(
            "SELECT {} FROM workout_sessions
             WHERE user_id = $1 AND ($2::uuid IS NULL OR plan_id = $2)
             ORDER BY date_started DESC",
            SESSION_COLUMNS
        ))
        .bind(user_id)
        .bind(plan_id)
        .fetch_all(&self.db)
        .await?;

        Ok(sessions)
    }

    async fn insert_exercise_log(&self, log: &NewExerciseLog) -> Result<ExerciseLogRecord> {
        let mut tx = self.db.begin().await?;

        let bumped = sqlx::query(
            "UPDATE workout_sessions SET completed_exercises = completed_exercises + 1
             WHERE id = $1 AND status = $2",
        )
        .bind(log.session_id)
        .bind(SessionStatus::InProgress)
        .execute(&mut *tx)
        .await?;

        if bumped.rows_affected() == 0 {
            bail!("workout session {} is not in progress", log.session_id);
        }

        let record = sqlx::query_as::<_, ExerciseLogRecord>(&format!(
            "INSERT INTO user_exercise_logs
                (id, user_id, exercise_id, plan_id, session_id, sets_completed, reps_completed,
                 duration_minutes, weight_kg, notes, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {}",
            LOG_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(log.user_id)
        .bind(log.exercise_id)
        .bind(log.plan_id)
        .bind(log.session_id)
        .bind(log.sets_completed)
        .bind(log.reps_completed)
        .bind(log.duration_minutes)
        .bind(log.weight_kg)
        .bind(&log.notes)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn list_session_logs(&self, session_id: Uuid) -> Result<Vec<ExerciseLogRecord>> {
        let logs = sqlx::query_as::<_, ExerciseLogRecord>(&format!(
            "SELECT {} FROM user_exercise_logs WHERE session_id = $1 ORDER BY completed_at ASC",
            LOG_COLUMNS
        ))
        .bind(session_id)
        .fetch_all(&self.db)
        .await?;

        Ok(logs)
    }

    async fn complete_session(
        &self,
        session_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<WorkoutSession> {
        let mut tx = self.db.begin().await?;

        let session = sqlx::query_as::<_, WorkoutSession>(&format!(
            "UPDATE workout_sessions SET status = $2, date_completed = $3
             WHERE id = $1 AND status = $4
             RETURNING {}",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .bind(SessionStatus::Completed)
        .bind(completed_at)
        .bind(SessionStatus::InProgress)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(session) = session else {
            bail!("workout session {} is not in progress", session_id);
        };

        sqlx::query(
            "UPDATE exercise_plans
             SET completed_sessions = completed_sessions + 1, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(session.plan_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(session)
    }

    async fn cancel_session(
        &self,
        session_id: Uuid,
        cancelled_at: DateTime<Utc>,
    ) -> Result<WorkoutSession> {
        let session = sqlx::query_as::<_, WorkoutSession>(&format!(
            "UPDATE workout_sessions SET status = $2, date_completed = $3
             WHERE id = $1 AND status = $4
             RETURNING {}",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .bind(SessionStatus::Cancelled)
        .bind(cancelled_at)
        .bind(SessionStatus::InProgress)
        .fetch_optional(&self.db)
        .await?;

        match session {
            Some(session) => Ok(session),
            None => bail!("workout session {} is not in progress", session_id),
        }
    }

    async fn create_notification(
        &self,
        user_id: Uuid,
        request: &CreateNotificationRequest,
    ) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (id, user_id, title, message, scheduled_at, is_read, created_at)
             VALUES ($1, $2, $3, $4, $5, FALSE, NOW())
             RETURNING {}",
            NOTIFICATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&request.title)
        .bind(&request.message)
        .bind(request.scheduled_at)
        .fetch_one(&self.db)
        .await?;

        Ok(notification)
    }

    async fn list_notifications(&self, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {} FROM notifications
             WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
             ORDER BY scheduled_at DESC",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }

    async fn list_unread_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {} FROM notifications
             WHERE user_id = $1 AND NOT is_read AND scheduled_at >= $2 AND scheduled_at <= $3
             ORDER BY scheduled_at ASC",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }

    async fn mark_notification_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
