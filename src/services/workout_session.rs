//! Live workout session: the state machine that walks a user through the
//! ordered exercises of a plan and records what was actually performed.

use chrono::Utc;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::models::{
    validate_log_update, ExerciseLog, ExerciseLogRecord, FinishSummary, LogUpdate,
    NewExerciseLog, PlanExerciseDetail, SessionPhase, SessionSnapshot, WorkoutSession,
};
use crate::services::session_clock::{format_elapsed, SessionClock};
use crate::store::DynFitnessStore;

#[derive(Error, Debug)]
pub enum WorkoutError {
    #[error("Plan not found")]
    PlanNotFound,
    #[error("Workout session not found")]
    SessionNotFound,
    #[error("Exercise {0} is not part of this plan")]
    ExerciseNotInPlan(Uuid),
    #[error("Exercise {0} is already completed")]
    AlreadyCompleted(Uuid),
    #[error("No exercise at position {0}")]
    InvalidIndex(usize),
    #[error("Complete at least one exercise before finishing the session")]
    NothingCompleted,
    #[error("Workout session is not active")]
    NotActive,
    #[error("Invalid log value: {0}")]
    InvalidLogValue(String),
    #[error("Storage error: {0}")]
    Store(#[from] anyhow::Error),
}

/// One user's in-progress attempt at a plan.
///
/// Local state mirrors the remote rows and is only changed after the
/// corresponding store call succeeds.
pub struct WorkoutSessionController {
    store: DynFitnessStore,
    user_id: Uuid,
    plan_id: Uuid,
    phase: SessionPhase,
    session: Option<WorkoutSession>,
    exercises: Vec<PlanExerciseDetail>,
    logs: HashMap<Uuid, ExerciseLog>,
    current_index: usize,
    clock: Option<SessionClock>,
}

impl std::fmt::Debug for WorkoutSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkoutSessionController")
            .field("user_id", &self.user_id)
            .field("plan_id", &self.plan_id)
            .field("phase", &self.phase)
            .field("session_id", &self.session.as_ref().map(|s| s.id))
            .field("exercises", &self.exercises.len())
            .field("current_index", &self.current_index)
            .finish()
    }
}

impl WorkoutSessionController {
    pub fn new(store: DynFitnessStore, user_id: Uuid, plan_id: Uuid) -> Self {
        Self {
            store,
            user_id,
            plan_id,
            phase: SessionPhase::Loading,
            session: None,
            exercises: Vec::new(),
            logs: HashMap::new(),
            current_index: 0,
            clock: None,
        }
    }

    /// Resume the user's in-progress session for the plan, or start a new one.
    pub async fn open(store: DynFitnessStore, user_id: Uuid, plan_id: Uuid) -> Result<Self, WorkoutError> {
        let mut controller = Self::new(store, user_id, plan_id);
        controller.load().await?;
        Ok(controller)
    }

    pub async fn load(&mut self) -> Result<(), WorkoutError> {
        if self.phase != SessionPhase::Loading {
            return Err(WorkoutError::NotActive);
        }

        let plan = self
            .store
            .get_plan(self.user_id, self.plan_id)
            .await
            .map_err(|e| self.store_failure("load plan", e))?
            .ok_or(WorkoutError::PlanNotFound)?;

        let exercises = self
            .store
            .list_plan_exercises(plan.id)
            .await
            .map_err(|e| self.store_failure("load plan exercises", e))?;

        let existing = self
            .store
            .find_in_progress_session(self.user_id, plan.id)
            .await
            .map_err(|e| self.store_failure("look up in-progress session", e))?;

        let (session, previous_logs) = match existing {
            Some(session) => {
                let logs = self
                    .store
                    .list_session_logs(session.id)
                    .await
                    .map_err(|e| self.store_failure("load session logs", e))?;
                tracing::info!(
                    session_id = %session.id,
                    plan_id = %plan.id,
                    completed = logs.len(),
                    "Resuming workout session"
                );
                (session, logs)
            }
            None => {
                let session = self
                    .store
                    .create_session(self.user_id, plan.id, exercises.len() as i32)
                    .await
                    .map_err(|e| self.store_failure("create session", e))?;
                tracing::info!(
                    session_id = %session.id,
                    plan_id = %plan.id,
                    session_number = session.session_number,
                    "Started workout session"
                );
                (session, Vec::new())
            }
        };

        let mut logs: HashMap<Uuid, ExerciseLog> = exercises
            .iter()
            .map(|detail| (detail.plan_exercise.exercise_id, ExerciseLog::from_targets(detail)))
            .collect();

        for record in &previous_logs {
            if let Some(log) = logs.get_mut(&record.exercise_id) {
                log.apply_record(record);
            }
        }

        self.clock = Some(SessionClock::start(session.date_started));
        self.session = Some(session);
        self.exercises = exercises;
        self.logs = logs;
        self.current_index = self.first_uncompleted().unwrap_or(0);
        self.phase = SessionPhase::Active;

        Ok(())
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn plan_id(&self) -> Uuid {
        self.plan_id
    }

    pub fn session(&self) -> Option<&WorkoutSession> {
        self.session.as_ref()
    }

    pub fn exercises(&self) -> &[PlanExerciseDetail] {
        &self.exercises
    }

    pub fn log(&self, exercise_id: Uuid) -> Option<&ExerciseLog> {
        self.logs.get(&exercise_id)
    }

    /// Logs in plan order.
    pub fn logs(&self) -> Vec<ExerciseLog> {
        self.exercises
            .iter()
            .filter_map(|detail| self.logs.get(&detail.plan_exercise.exercise_id).cloned())
            .collect()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_exercise(&self) -> Option<&PlanExerciseDetail> {
        self.exercises.get(self.current_index)
    }

    pub fn completed_count(&self) -> usize {
        self.logs.values().filter(|log| log.completed).count()
    }

    pub fn progress_percentage(&self) -> f64 {
        if self.exercises.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.exercises.len() as f64 * 100.0
    }

    pub fn update_log(&mut self, exercise_id: Uuid, update: LogUpdate) -> Result<&ExerciseLog, WorkoutError> {
        self.ensure_active()?;
        validate_log_update(&update).map_err(|e| WorkoutError::InvalidLogValue(e.to_string()))?;

        let log = self
            .logs
            .get_mut(&exercise_id)
            .ok_or(WorkoutError::ExerciseNotInPlan(exercise_id))?;

        if log.completed {
            return Err(WorkoutError::AlreadyCompleted(exercise_id));
        }

        if let Some(sets) = update.sets_completed {
            log.sets_completed = sets;
        }
        if let Some(reps) = update.reps_completed {
            log.reps_completed = reps;
        }
        if let Some(duration) = update.duration_minutes {
            log.duration_minutes = duration;
        }
        if let Some(weight) = update.weight_kg {
            log.weight_kg = weight;
        }
        if let Some(notes) = update.notes {
            log.notes = notes;
        }

        Ok(log)
    }

    pub fn select_exercise(&mut self, index: usize) -> Result<(), WorkoutError> {
        self.ensure_active()?;
        if index >= self.exercises.len() {
            return Err(WorkoutError::InvalidIndex(index));
        }
        self.current_index = index;
        Ok(())
    }

    /// Persist the exercise's log, then mark it completed and move on to the
    /// next uncompleted exercise.
    pub async fn complete_exercise(&mut self, exercise_id: Uuid) -> Result<ExerciseLogRecord, WorkoutError> {
        self.ensure_active()?;

        let log = self
            .logs
            .get(&exercise_id)
            .ok_or(WorkoutError::ExerciseNotInPlan(exercise_id))?;
        if log.completed {
            return Err(WorkoutError::AlreadyCompleted(exercise_id));
        }

        let session = self.session.as_ref().ok_or(WorkoutError::NotActive)?;
        let new_log = NewExerciseLog::from_log(session, log);

        let record = self
            .store
            .insert_exercise_log(&new_log)
            .await
            .map_err(|e| self.store_failure("record exercise completion", e))?;

        if let Some(log) = self.logs.get_mut(&exercise_id) {
            log.completed = true;
        }
        if let Some(session) = self.session.as_mut() {
            session.completed_exercises += 1;
        }

        if let Some(position) = self.position_of(exercise_id) {
            self.current_index = position;
        }
        if let Some(next) = self.next_uncompleted_after(self.current_index) {
            self.current_index = next;
        }

        tracing::info!(
            session_id = %record.session_id,
            exercise_id = %exercise_id,
            completed = self.completed_count(),
            total = self.exercises.len(),
            "Exercise completed"
        );

        Ok(record)
    }

    /// What the confirmation prompt reports before finishing.
    pub fn summary(&self) -> FinishSummary {
        FinishSummary::new(self.completed_count(), self.exercises.len())
    }

    pub async fn finish(&mut self) -> Result<WorkoutSession, WorkoutError> {
        self.ensure_active()?;
        if self.completed_count() == 0 {
            return Err(WorkoutError::NothingCompleted);
        }

        let session_id = self.session.as_ref().map(|s| s.id).ok_or(WorkoutError::NotActive)?;
        let session = self
            .store
            .complete_session(session_id, Utc::now())
            .await
            .map_err(|e| self.store_failure("complete session", e))?;

        self.stop_clock();
        self.session = Some(session.clone());
        self.phase = SessionPhase::Finished;

        tracing::info!(
            session_id = %session.id,
            plan_id = %session.plan_id,
            completed = session.completed_exercises,
            total = session.total_exercises,
            "Workout session finished"
        );

        Ok(session)
    }

    pub async fn cancel(&mut self) -> Result<WorkoutSession, WorkoutError> {
        self.ensure_active()?;

        let session_id = self.session.as_ref().map(|s| s.id).ok_or(WorkoutError::NotActive)?;
        let session = self
            .store
            .cancel_session(session_id, Utc::now())
            .await
            .map_err(|e| self.store_failure("cancel session", e))?;

        self.stop_clock();
        self.session = Some(session.clone());
        self.phase = SessionPhase::Cancelled;

        tracing::info!(session_id = %session.id, "Workout session cancelled");

        Ok(session)
    }

    pub fn pause_clock(&self) -> Result<(), WorkoutError> {
        self.ensure_active()?;
        if let Some(clock) = &self.clock {
            clock.pause();
        }
        Ok(())
    }

    pub fn resume_clock(&self) -> Result<(), WorkoutError> {
        self.ensure_active()?;
        if let Some(clock) = &self.clock {
            clock.resume();
        }
        Ok(())
    }

    pub fn clock_running(&self) -> bool {
        self.clock.as_ref().map(|c| c.is_running()).unwrap_or(false)
    }

    pub fn elapsed_seconds(&self) -> i64 {
        match (&self.clock, &self.session) {
            (Some(clock), _) => clock.elapsed_seconds(),
            (None, Some(session)) => {
                let end = session.date_completed.unwrap_or_else(Utc::now);
                (end - session.date_started).num_seconds().max(0)
            }
            (None, None) => 0,
        }
    }

    pub fn subscribe_clock(&self) -> Option<watch::Receiver<i64>> {
        self.clock.as_ref().map(|c| c.subscribe())
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, WorkoutError> {
        let session = self.session.clone().ok_or(WorkoutError::NotActive)?;
        let elapsed_seconds = self.elapsed_seconds();

        Ok(SessionSnapshot {
            phase: self.phase,
            session,
            exercises: self.exercises.clone(),
            logs: self.logs(),
            current_index: self.current_index,
            elapsed_seconds,
            elapsed: format_elapsed(elapsed_seconds),
            clock_running: self.clock_running(),
            progress_percentage: self.progress_percentage(),
        })
    }

    fn ensure_active(&self) -> Result<(), WorkoutError> {
        if self.phase == SessionPhase::Active {
            Ok(())
        } else {
            Err(WorkoutError::NotActive)
        }
    }

    /// Stop the ticker; elapsed time is still derived from `date_started`.
    pub fn stop_clock(&mut self) {
        if let Some(clock) = self.clock.take() {
            clock.stop();
        }
    }

    fn store_failure(&self, action: &str, error: anyhow::Error) -> WorkoutError {
        tracing::error!(
            user_id = %self.user_id,
            plan_id = %self.plan_id,
            "Failed to {}: {:#}",
            action,
            error
        );
        WorkoutError::Store(error)
    }

    fn is_completed_at(&self, index: usize) -> bool {
        self.exercises
            .get(index)
            .and_then(|detail| self.logs.get(&detail.plan_exercise.exercise_id))
            .map(|log| log.completed)
            .unwrap_or(false)
    }

    fn position_of(&self, exercise_id: Uuid) -> Option<usize> {
        self.exercises
            .iter()
            .position(|detail| detail.plan_exercise.exercise_id == exercise_id)
    }

    fn first_uncompleted(&self) -> Option<usize> {
        (0..self.exercises.len()).find(|&i| !self.is_completed_at(i))
    }

    /// Next uncompleted slot after `index`, wrapping around to the start.
    fn next_uncompleted_after(&self, index: usize) -> Option<usize> {
        let len = self.exercises.len();
        (1..len)
            .map(|offset| (index + offset) % len)
            .find(|&i| !self.is_completed_at(i))
    }
}
