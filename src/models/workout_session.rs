use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::PlanExerciseDetail;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "workout_session_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub session_number: i32,
    pub status: SessionStatus,
    pub total_exercises: i32,
    pub completed_exercises: i32,
    pub date_started: DateTime<Utc>,
    pub date_completed: Option<DateTime<Utc>>,
}

/// What the user actually performed for one exercise, kept in memory while
/// the session is live. `completed` is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseLog {
    pub exercise_id: Uuid,
    pub sets_completed: i32,
    pub reps_completed: i32,
    pub duration_minutes: i32,
    pub weight_kg: f64,
    pub notes: String,
    pub completed: bool,
}

impl ExerciseLog {
    /// Pre-fill from the prescribed targets; missing targets become zero.
    pub fn from_targets(detail: &PlanExerciseDetail) -> Self {
        let target = &detail.plan_exercise;
        Self {
            exercise_id: target.exercise_id,
            sets_completed: target.sets.unwrap_or(0),
            reps_completed: target.reps.unwrap_or(0),
            duration_minutes: target.duration_minutes.unwrap_or(0),
            weight_kg: target.weight_kg.unwrap_or(0.0),
            notes: String::new(),
            completed: false,
        }
    }

    pub fn apply_record(&mut self, record: &ExerciseLogRecord) {
        self.sets_completed = record.sets_completed;
        self.reps_completed = record.reps_completed;
        self.duration_minutes = record.duration_minutes;
        self.weight_kg = record.weight_kg;
        self.notes = record.notes.clone().unwrap_or_default();
        self.completed = true;
    }
}

/// Partial edit of a live log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogUpdate {
    pub sets_completed: Option<i32>,
    pub reps_completed: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
}

/// Persisted `user_exercise_logs` row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ExerciseLogRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_id: Uuid,
    pub plan_id: Uuid,
    pub session_id: Uuid,
    pub sets_completed: i32,
    pub reps_completed: i32,
    pub duration_minutes: i32,
    pub weight_kg: f64,
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExerciseLog {
    pub user_id: Uuid,
    pub exercise_id: Uuid,
    pub plan_id: Uuid,
    pub session_id: Uuid,
    pub sets_completed: i32,
    pub reps_completed: i32,
    pub duration_minutes: i32,
    pub weight_kg: f64,
    pub notes: Option<String>,
}

impl NewExerciseLog {
    pub fn from_log(session: &WorkoutSession, log: &ExerciseLog) -> Self {
        Self {
            user_id: session.user_id,
            exercise_id: log.exercise_id,
            plan_id: session.plan_id,
            session_id: session.id,
            sets_completed: log.sets_completed,
            reps_completed: log.reps_completed,
            duration_minutes: log.duration_minutes,
            weight_kg: log.weight_kg,
            notes: if log.notes.trim().is_empty() {
                None
            } else {
                Some(log.notes.clone())
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Loading,
    Active,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinishSummary {
    pub completed: usize,
    pub total: usize,
    pub message: String,
}

impl FinishSummary {
    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            message: format!("Completed {} of {} exercises", completed, total),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub session: WorkoutSession,
    pub exercises: Vec<PlanExerciseDetail>,
    pub logs: Vec<ExerciseLog>,
    pub current_index: usize,
    pub elapsed_seconds: i64,
    pub elapsed: String,
    pub clock_running: bool,
    pub progress_percentage: f64,
}

#[derive(Debug, Deserialize)]
pub struct SelectExerciseRequest {
    pub index: usize,
}
